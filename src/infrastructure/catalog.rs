//! Static reference data: model catalog, categories and prompt suggestions

use crate::core::random::ArenaRandom;
use crate::infrastructure::entities::ModelInfo;
use di::inject;
use di::injectable;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub usage_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub sort_order: u32,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptSuggestion {
    pub id: String,
    pub title: String,
    pub text: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub model_id: String,
    pub model_name: String,
    pub provider: String,
    pub rank: u32,
    pub score: f64,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub total_battles: u32,
    pub win_rate: f64,
    pub quality_score: f64,
    pub is_provisional: bool,
}

const MODELS: &[(&str, &str, &str)] = &[
    ("gpt-4o", "GPT-4o", "OpenAI"),
    ("gpt-4-turbo", "GPT-4 Turbo", "OpenAI"),
    ("claude-3.5-sonnet", "Claude 3.5 Sonnet", "Anthropic"),
    ("claude-3-opus", "Claude 3 Opus", "Anthropic"),
    ("gemini-pro-1.5", "Gemini Pro 1.5", "Google"),
    ("gemini-ultra", "Gemini Ultra", "Google"),
    ("llama-3.1-70b", "Llama 3.1 70B", "Meta"),
    ("llama-3.1-405b", "Llama 3.1 405B", "Meta"),
    ("mistral-large", "Mistral Large", "Mistral AI"),
    ("command-r-plus", "Command R+", "Cohere"),
];

type CategoryRow = (&'static str, &'static str, &'static str, &'static [(&'static str, &'static str, u32)]);

const CATEGORIES: &[CategoryRow] = &[
    (
        "SEO",
        "seo",
        "Search Engine Optimization",
        &[
            ("Meta Descriptions", "meta-descriptions", 42),
            ("Title Tags", "title-tags", 38),
            ("Keywords Research", "keywords-research", 35),
            ("Content Optimization", "content-optimization", 31),
        ],
    ),
    (
        "SMM",
        "smm",
        "Social Media Marketing",
        &[
            ("LinkedIn Posts", "linkedin-posts", 28),
            ("Instagram Captions", "instagram-captions", 26),
            ("Twitter Threads", "twitter-threads", 24),
            ("Social Strategy", "social-strategy", 22),
        ],
    ),
    (
        "Content",
        "content",
        "Content Marketing",
        &[
            ("Blog Posts", "blog-posts", 45),
            ("Email Copy", "email-copy", 40),
            ("Landing Pages", "landing-pages", 38),
        ],
    ),
    (
        "PPC",
        "ppc",
        "Pay-Per-Click Advertising",
        &[
            ("Ad Copy", "ad-copy", 33),
            ("Google Ads", "google-ads", 30),
            ("Facebook Ads", "facebook-ads", 28),
        ],
    ),
    (
        "QWE",
        "qwe",
        "Quick Web Engineering",
        &[
            ("Frontend Development", "frontend-dev", 52),
            ("Backend APIs", "backend-apis", 48),
            ("Database Design", "database-design", 41),
            ("DevOps & Deployment", "devops-deployment", 36),
        ],
    ),
];

const SUGGESTIONS: &[(&str, &str, &str)] = &[
    ("SEO Blog Outline", "Create an SEO-optimized blog post outline about sustainable fashion trends for Q1 2025", "SEO"),
    ("Meta Description", "Write a compelling meta description (155 chars) for a landing page about AI-powered marketing tools", "SEO"),
    ("LinkedIn Post", "Draft an engaging LinkedIn post about the future of remote work in tech companies", "SMM"),
    ("Instagram Caption", "Create an Instagram caption for a product launch in the sustainable beauty niche", "SMM"),
    ("Email Subject Lines", "Generate 5 compelling email subject lines for a SaaS product announcement", "Content"),
    ("Landing Page Copy", "Write a persuasive hero section for a B2B marketing automation platform", "Content"),
    ("Google Ads Copy", "Create 3 variations of Google Ads copy (90 chars) for an e-commerce store selling eco-friendly products", "PPC"),
    ("Facebook Ad Headline", "Write 5 attention-grabbing Facebook ad headlines for a fitness app targeting busy professionals", "PPC"),
    ("React Component", "Create a reusable React component for a pagination control with TypeScript support and accessibility features", "QWE"),
    ("REST API Endpoint", "Design a RESTful API endpoint for user authentication with JWT tokens and refresh token rotation", "QWE"),
    ("Database Schema", "Create a PostgreSQL schema for an e-commerce platform with proper indexing and relationships", "QWE"),
    ("Docker Configuration", "Write a Dockerfile and docker-compose.yml for a Node.js microservice with MongoDB and Redis", "QWE"),
];

pub struct ReferenceData {
    models: Vec<ModelInfo>,
    categories: Vec<Category>,
    suggestions: Vec<PromptSuggestion>,
}

#[injectable]
impl ReferenceData {
    #[inject]
    pub fn create() -> ReferenceData {
        ReferenceData::builtin()
    }
}

impl ReferenceData {
    pub fn builtin() -> ReferenceData {
        let models = MODELS
            .iter()
            .map(|(id, name, provider)| ModelInfo {
                id: (*id).to_owned(),
                name: (*name).to_owned(),
                provider: (*provider).to_owned(),
            })
            .collect();

        let mut tag_id = 0;
        let categories = CATEGORIES
            .iter()
            .enumerate()
            .map(|(index, (name, slug, description, tags))| Category {
                id: (index + 1).to_string(),
                name: (*name).to_owned(),
                slug: (*slug).to_owned(),
                description: (*description).to_owned(),
                sort_order: index as u32 + 1,
                tags: tags
                    .iter()
                    .map(|(name, slug, usage_count)| {
                        tag_id += 1;
                        Tag {
                            id: tag_id.to_string(),
                            name: (*name).to_owned(),
                            slug: (*slug).to_owned(),
                            description: None,
                            usage_count: *usage_count,
                        }
                    })
                    .collect(),
            })
            .collect();

        let suggestions = SUGGESTIONS
            .iter()
            .enumerate()
            .map(|(index, (title, text, category))| PromptSuggestion {
                id: (index + 1).to_string(),
                title: (*title).to_owned(),
                text: (*text).to_owned(),
                category: (*category).to_owned(),
            })
            .collect();

        ReferenceData {
            models,
            categories,
            suggestions,
        }
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.slug == slug)
    }

    /// Up to `limit` suggestions in random order.
    pub fn suggestions(&self, random: &ArenaRandom, limit: usize) -> Vec<PromptSuggestion> {
        let mut shuffled = random.shuffled(&self.suggestions);
        shuffled.truncate(limit);
        shuffled
    }

    /// Ranks follow catalog order; battle counts are synthetic.
    pub fn leaderboard(&self, random: &ArenaRandom) -> Vec<LeaderboardEntry> {
        self.models
            .iter()
            .enumerate()
            .map(|(index, model)| {
                let step = index as f64;
                LeaderboardEntry {
                    model_id: model.id.clone(),
                    model_name: model.name.clone(),
                    provider: model.provider.clone(),
                    rank: index as u32 + 1,
                    score: 45.0 - step * 2.5,
                    wins: random.range(20..70),
                    losses: random.range(5..25),
                    ties: random.range(1..11),
                    total_battles: random.range(40..120),
                    win_rate: 0.85 - step * 0.05,
                    quality_score: 0.95 - step * 0.03,
                    is_provisional: index > 5,
                }
            })
            .collect()
    }

    /// A random category and up to two of its tag slugs.
    pub fn random_topic(&self, random: &ArenaRandom) -> Option<(String, Vec<String>)> {
        let category = random.choose(&self.categories)?;
        let tags = random
            .sample(&category.tags, 2)
            .into_iter()
            .map(|tag| tag.slug.clone())
            .collect();
        Some((category.slug.clone(), tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_shape() {
        let data = ReferenceData::builtin();

        assert_eq!(data.models().len(), 10);
        assert_eq!(data.categories().len(), 5);
        assert_eq!(data.category("qwe").map(|c| c.tags.len()), Some(4));
        assert!(data.category("unknown").is_none());

        let tag_ids: Vec<&str> = data
            .categories()
            .iter()
            .flat_map(|c| c.tags.iter().map(|t| t.id.as_str()))
            .collect();
        assert_eq!(tag_ids.first(), Some(&"1"));
        assert_eq!(tag_ids.last(), Some(&"18"));
    }

    #[test]
    fn test_random_topic_picks_tags_of_the_category() {
        let data = ReferenceData::builtin();
        let random = ArenaRandom::seeded(11);

        let (slug, tags) = data.random_topic(&random).unwrap();
        let category = data.category(&slug).unwrap();

        assert_eq!(tags.len(), 2);
        assert!(tags.iter().all(|t| category.tags.iter().any(|c| &c.slug == t)));
    }

    #[test]
    fn test_suggestions_respect_limit() {
        let data = ReferenceData::builtin();
        let random = ArenaRandom::seeded(5);

        assert_eq!(data.suggestions(&random, 3).len(), 3);
        assert_eq!(data.suggestions(&random, 100).len(), 12);
    }

    #[test]
    fn test_leaderboard_is_ranked() {
        let data = ReferenceData::builtin();
        let entries = data.leaderboard(&ArenaRandom::seeded(1));

        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].model_id, "gpt-4o");
        assert!(entries.windows(2).all(|w| w[0].score > w[1].score));
        assert!(entries[6].is_provisional && !entries[5].is_provisional);
    }
}
