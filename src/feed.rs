//! Marketplace project feed: filtering, sorting, and paging over a static
//! catalogue.
//!
//! The catalogue is a read-only, in-memory list. A [`ProjectFilter`] selects
//! matching projects, a [`SortOrder`] orders them, and the resulting
//! [`FeedCursor`] hands them out in pages of [`ITEMS_PER_PAGE`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Page size used by the marketplace grid.
pub const ITEMS_PER_PAGE: usize = 6;

/// Whether a project is staffed by one performer or a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// A single freelancer.
    Individual,
    /// A studio or group of performers.
    Team,
}

impl ProjectKind {
    /// Every kind, in filter-panel order.
    pub const ALL: [Self; 2] = [Self::Individual, Self::Team];
}

/// Seniority the client is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Middle,
    Senior,
    Expert,
}

impl ExperienceLevel {
    /// Every level, from least to most senior.
    pub const ALL: [Self; 4] = [Self::Junior, Self::Middle, Self::Senior, Self::Expert];
}

/// The client who posted a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Company or display name.
    pub name: String,
    /// Average review score.
    pub rating: f64,
    /// Number of reviews behind `rating`.
    pub reviews: u32,
}

/// One milestone of a project's plan, as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStage {
    pub name: String,
    /// Display string, e.g. `"4 days"`.
    pub duration: String,
}

/// A project listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Monotonic listing id; higher is newer.
    pub id: u32,
    pub title: String,
    /// Short summary shown on the card.
    pub description: String,
    /// Long-form brief shown in the detail view. May contain newlines.
    pub full_description: String,
    /// Budget in whole currency units.
    pub budget: u32,
    /// Deadline in days.
    pub deadline: u32,
    /// Required skills, matched by [`ProjectFilter::skill`].
    pub skills: Vec<String>,
    pub category: String,
    /// Free-form place, e.g. `"Remote"` or `"London, UK"`.
    pub location: String,
    /// Serialized as `"type"`.
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    pub experience: ExperienceLevel,
    /// Number of performers who have responded.
    pub responses: u32,
    /// Listing badge, e.g. `"New"` or `"Urgent"`.
    pub status: String,
    /// Highlighted on the card.
    pub featured: bool,
    /// How well the project fits the viewer's profile, in `0..=100`.
    pub match_score: u8,
    pub client: ClientInfo,
    /// Milestones in delivery order.
    pub stages: Vec<ProjectStage>,
}

/// Criteria a project must meet to appear in the feed.
///
/// All text comparisons are case-insensitive substring matches. An empty
/// text criterion matches everything; an empty `kinds` or `experience` set
/// matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFilter {
    /// Matched against title and description.
    pub search: String,
    /// Inclusive lower budget bound.
    pub min_budget: u32,
    /// Inclusive upper budget bound.
    pub max_budget: u32,
    /// Longest acceptable deadline in days, inclusive.
    pub max_deadline: u32,
    /// Matched against the project location.
    pub location: String,
    /// Accepted project kinds.
    pub kinds: Vec<ProjectKind>,
    /// Accepted experience levels.
    pub experience: Vec<ExperienceLevel>,
    /// Matched against each skill.
    pub skill: String,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            min_budget: 0,
            max_budget: 1_000_000,
            max_deadline: 365,
            location: String::new(),
            kinds: ProjectKind::ALL.to_vec(),
            experience: ExperienceLevel::ALL.to_vec(),
            skill: String::new(),
        }
    }
}

impl ProjectFilter {
    /// Returns `true` if `project` satisfies every criterion.
    pub fn matches(&self, project: &Project) -> bool {
        let search = self.search.to_lowercase();
        let location = self.location.to_lowercase();
        let skill = self.skill.to_lowercase();

        let matches_search = project.title.to_lowercase().contains(&search)
            || project.description.to_lowercase().contains(&search);
        let matches_budget = (self.min_budget..=self.max_budget).contains(&project.budget);
        let matches_location =
            location.is_empty() || project.location.to_lowercase().contains(&location);
        let matches_skill = skill.is_empty()
            || project
                .skills
                .iter()
                .any(|s| s.to_lowercase().contains(&skill));

        matches_search
            && matches_budget
            && project.deadline <= self.max_deadline
            && matches_location
            && self.kinds.contains(&project.kind)
            && self.experience.contains(&project.experience)
            && matches_skill
    }
}

/// Ordering applied to the filtered feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Highest id first.
    Newest,
    /// Cheapest first.
    BudgetAsc,
    /// Most expensive first.
    BudgetDesc,
    /// Shortest deadline first.
    Deadline,
    /// Catalogue order.
    #[default]
    Unsorted,
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Parse a sort selector value. Unknown values mean [`SortOrder::Unsorted`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "newest" => Self::Newest,
            "budget_asc" => Self::BudgetAsc,
            "budget_desc" => Self::BudgetDesc,
            "deadline" => Self::Deadline,
            _ => Self::Unsorted,
        })
    }
}

impl SortOrder {
    /// Stable-sort `projects` in place.
    pub fn sort(self, projects: &mut [&Project]) {
        match self {
            Self::Newest => projects.sort_by(|a, b| b.id.cmp(&a.id)),
            Self::BudgetAsc => projects.sort_by_key(|p| p.budget),
            Self::BudgetDesc => projects.sort_by(|a, b| b.budget.cmp(&a.budget)),
            Self::Deadline => projects.sort_by_key(|p| p.deadline),
            Self::Unsorted => {}
        }
    }
}

/// The read-only project catalogue.
#[derive(Debug, Clone, Default)]
pub struct ProjectFeed {
    projects: Vec<Project>,
}

impl ProjectFeed {
    /// A feed over `projects`, kept in the given order.
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// A feed over [`sample_projects`].
    pub fn sample() -> Self {
        Self::new(sample_projects())
    }

    /// The whole catalogue in its original order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Look up a project by id, e.g. to open its detail view.
    pub fn find(&self, id: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Filter and sort the catalogue, returning a cursor at the first page.
    pub fn query(&self, filter: &ProjectFilter, sort: SortOrder) -> FeedCursor<'_> {
        let mut matches: Vec<&Project> =
            self.projects.iter().filter(|p| filter.matches(p)).collect();
        sort.sort(&mut matches);
        FeedCursor {
            matches,
            offset: 0,
            page_size: ITEMS_PER_PAGE,
        }
    }
}

/// Pages through one query result.
#[derive(Debug, Clone)]
pub struct FeedCursor<'a> {
    matches: Vec<&'a Project>,
    offset: usize,
    page_size: usize,
}

impl<'a> FeedCursor<'a> {
    /// Use a page size other than [`ITEMS_PER_PAGE`]. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of projects that matched the query.
    pub fn total(&self) -> usize {
        self.matches.len()
    }

    /// Whether nothing matched the query.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// All matches in sorted order, regardless of paging.
    pub fn all(&self) -> &[&'a Project] {
        &self.matches
    }

    /// Number of projects handed out so far.
    pub fn displayed(&self) -> usize {
        self.offset
    }

    /// Whether another call to [`next_page`](FeedCursor::next_page) will
    /// yield projects.
    pub fn has_more(&self) -> bool {
        self.offset < self.matches.len()
    }

    /// Return the next page, or `None` once every match has been shown.
    pub fn next_page(&mut self) -> Option<&[&'a Project]> {
        if !self.has_more() {
            return None;
        }
        let start = self.offset;
        let end = (start + self.page_size).min(self.matches.len());
        self.offset = end;
        self.matches.get(start..end)
    }

    /// Rewind to the first page.
    pub fn rewind(&mut self) {
        self.offset = 0;
    }
}

fn skills(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

fn stages(plan: &[(&str, &str)]) -> Vec<ProjectStage> {
    plan.iter()
        .map(|(name, duration)| ProjectStage {
            name: (*name).to_owned(),
            duration: (*duration).to_owned(),
        })
        .collect()
}

fn client(name: &str, rating: f64, reviews: u32) -> ClientInfo {
    ClientInfo {
        name: name.to_owned(),
        rating,
        reviews,
    }
}

/// The mock catalogue shown on the marketplace page.
pub fn sample_projects() -> Vec<Project> {
    vec![
        Project {
            id: 1,
            title: "Dashboard redesign for a SaaS platform".into(),
            description: "Modern interface for a B2B SaaS platform focused on analytics and data visualisation.".into(),
            full_description: "We are looking for an experienced UI/UX designer to fully redesign our SaaS platform.\n\nTasks:\n- Audit of the current interface\n- New design system\n- Prototypes of the main flows\n- Final mockups in Figma".into(),
            budget: 3500,
            deadline: 14,
            skills: skills(&["Figma", "UI Design", "Analytics"]),
            category: "UI/UX Design".into(),
            location: "Remote".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Middle,
            responses: 12,
            status: "New".into(),
            featured: true,
            match_score: 94,
            client: client("TechSolutions Inc.", 4.8, 15),
            stages: stages(&[
                ("Research and prototypes", "4 days"),
                ("Design concept", "3 days"),
                ("Final mockups", "7 days"),
            ]),
        },
        Project {
            id: 2,
            title: "Landing page for a crypto project".into(),
            description: "Animated landing page with Web3 wallet integration. Design is ready in Figma.".into(),
            full_description: "Frontend developer needed to build a landing page from a finished mockup. Complex GSAP animations and MetaMask/WalletConnect wallet connection are a must.".into(),
            budget: 4200,
            deadline: 21,
            skills: skills(&["React", "Web3", "GSAP"]),
            category: "Web Development".into(),
            location: "Remote".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Senior,
            responses: 8,
            status: "In progress".into(),
            featured: false,
            match_score: 89,
            client: client("CryptoFuture", 4.5, 8),
            stages: stages(&[
                ("Layout", "10 days"),
                ("Animations", "5 days"),
                ("Web3 integration", "6 days"),
            ]),
        },
        Project {
            id: 3,
            title: "Fitness mobile app design".into(),
            description: "iOS and Android app for workout tracking and nutrition plans.".into(),
            full_description: "Design a mobile app from scratch. Core features: workout tracker, meal calendar, social features.".into(),
            budget: 5800,
            deadline: 30,
            skills: skills(&["Mobile", "Fitness", "Health"]),
            category: "Mobile App".into(),
            location: "USA".into(),
            kind: ProjectKind::Team,
            experience: ExperienceLevel::Senior,
            responses: 5,
            status: "New".into(),
            featured: false,
            match_score: 91,
            client: client("FitLife Global", 5.0, 23),
            stages: stages(&[
                ("UX research", "7 days"),
                ("UI design", "14 days"),
                ("Android adaptation", "9 days"),
            ]),
        },
        Project {
            id: 4,
            title: "Brand identity for a tech startup".into(),
            description: "Logo, palette and brand book for an AI startup.".into(),
            full_description: "We need a bold, futuristic brand. Logo, colour palette, typefaces, patterns.".into(),
            budget: 2900,
            deadline: 18,
            skills: skills(&["Logo", "Brand Identity", "AI"]),
            category: "Branding".into(),
            location: "Europe".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Middle,
            responses: 15,
            status: "New".into(),
            featured: false,
            match_score: 87,
            client: client("NeuroTech", 4.9, 31),
            stages: stages(&[("Logo", "5 days"), ("Identity", "7 days"), ("Brand book", "6 days")]),
        },
        Project {
            id: 5,
            title: "3D illustrations for a website".into(),
            description: "Set of cyberpunk-style 3D illustrations for an agency site.".into(),
            full_description: "Five unique 3D scenes for a landing page. Style: cyberpunk, neon, glassmorphism.".into(),
            budget: 3200,
            deadline: 25,
            skills: skills(&["3D", "Blender", "Cyberpunk"]),
            category: "Illustration".into(),
            location: "Remote".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Middle,
            responses: 9,
            status: "New".into(),
            featured: true,
            match_score: 96,
            client: client("CyberAgency", 4.7, 19),
            stages: stages(&[
                ("Sketching", "5 days"),
                ("Modelling", "10 days"),
                ("Rendering", "10 days"),
            ]),
        },
        Project {
            id: 6,
            title: "E-commerce platform on Next.js".into(),
            description: "Storefront with checkout, payments and an admin panel.".into(),
            full_description: "Build a scalable online store. Stack: Next.js, PostgreSQL, Prisma, Stripe, Tailwind.".into(),
            budget: 7500,
            deadline: 45,
            skills: skills(&["Next.js", "TypeScript", "Stripe"]),
            category: "Full-Stack".into(),
            location: "Remote".into(),
            kind: ProjectKind::Team,
            experience: ExperienceLevel::Senior,
            responses: 18,
            status: "Started".into(),
            featured: false,
            match_score: 90,
            client: client("ShopifyPlus", 4.6, 27),
            stages: stages(&[
                ("Backend", "15 days"),
                ("Frontend", "20 days"),
                ("Testing", "10 days"),
            ]),
        },
        Project {
            id: 7,
            title: "AI avatars for video".into(),
            description: "Generate talking-head avatars from short reference clips.".into(),
            full_description: "Build a microservice that generates video avatars. Input: photo plus audio or text. Output: lip-synced mp4 video.".into(),
            budget: 8000,
            deadline: 40,
            skills: skills(&["Python", "AI/ML", "Computer Vision"]),
            category: "Artificial Intelligence".into(),
            location: "Remote".into(),
            kind: ProjectKind::Team,
            experience: ExperienceLevel::Expert,
            responses: 24,
            status: "Featured".into(),
            featured: true,
            match_score: 99,
            client: client("FutureFace AI", 5.0, 42),
            stages: stages(&[("MVP", "14 days"), ("Scale", "20 days")]),
        },
        Project {
            id: 8,
            title: "Corporate identity for FinTech".into(),
            description: "Full visual identity refresh for a digital bank.".into(),
            full_description: "We need a trustworthy yet modern identity. Target market: Gen Z and Millennials. Deliverables: brand book, UI kit in Figma.".into(),
            budget: 5500,
            deadline: 25,
            skills: skills(&["Branding", "Figma", "Typography"]),
            category: "Design".into(),
            location: "London, UK".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Senior,
            responses: 45,
            status: "Urgent".into(),
            featured: false,
            match_score: 88,
            client: client("NovaBank", 4.9, 12),
            stages: stages(&[("Concept", "7 days"), ("Production", "14 days")]),
        },
        Project {
            id: 9,
            title: "Smart contract audit (Solidity)".into(),
            description: "Security review of a lending protocol before mainnet launch.".into(),
            full_description: "Audit required for specialised lending pools. Focus on reentrancy attacks and oracle manipulation protection.".into(),
            budget: 4000,
            deadline: 10,
            skills: skills(&["Solidity", "Security", "Blockchain"]),
            category: "Development".into(),
            location: "Remote".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Expert,
            responses: 7,
            status: "New".into(),
            featured: true,
            match_score: 92,
            client: client("DeFi Shield", 4.7, 8),
            stages: stages(&[("Audit", "5 days"), ("Report", "2 days")]),
        },
        Project {
            id: 10,
            title: "Mobile game UI assets (sci-fi)".into(),
            description: "HUD, menus and icons for a sci-fi mobile game.".into(),
            full_description: "Style: cyberpunk sci-fi. Dark mode heavy with neon accents. Must be Unity compatible slices.".into(),
            budget: 2200,
            deadline: 20,
            skills: skills(&["Game UI", "2D Art", "Unity"]),
            category: "Design".into(),
            location: "Remote".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Middle,
            responses: 18,
            status: "New".into(),
            featured: false,
            match_score: 85,
            client: client("Galaxy Games", 4.5, 30),
            stages: stages(&[("Drafts", "5 days"), ("Final", "10 days")]),
        },
        Project {
            id: 11,
            title: "Marketing strategy for a SaaS launch".into(),
            description: "Go-to-market plan and channel strategy for a B2B launch.".into(),
            full_description: "We are launching a Notion competitor for designers. Need a 3-month roadmap to get the first 10k users.".into(),
            budget: 3000,
            deadline: 30,
            skills: skills(&["Marketing", "Strategy", "Growth"]),
            category: "Marketing".into(),
            location: "USA".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Senior,
            responses: 11,
            status: "Standard".into(),
            featured: false,
            match_score: 78,
            client: client("CreativeBlock", 4.8, 5),
            stages: stages(&[("Research", "7 days"), ("Strategy", "10 days")]),
        },
        Project {
            id: 12,
            title: "Video editor for a YouTube channel".into(),
            description: "Weekly tech reviews, cuts, captions and motion graphics.".into(),
            full_description: "Dynamic editing style with good pacing, motion graphics and sound design.".into(),
            budget: 1800,
            deadline: 90,
            skills: skills(&["Video Editing", "Motion Graphics"]),
            category: "Video".into(),
            location: "Remote".into(),
            kind: ProjectKind::Individual,
            experience: ExperienceLevel::Middle,
            responses: 50,
            status: "Standard".into(),
            featured: false,
            match_score: 95,
            client: client("TechInsider", 4.9, 100),
            stages: stages(&[("Trial", "1 video"), ("Contract", "3 months")]),
        },
    ]
}
