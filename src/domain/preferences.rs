/// Newsletter topics with a dedicated content block, in the order blocks are rendered.
pub const TOPIC_CATALOG: [Topic; 3] = [Topic::Tech, Topic::Sports, Topic::Entertainment];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Tech,
    Sports,
    Entertainment,
}

impl Topic {
    pub fn parse(tag: &str) -> Option<Topic> {
        match tag.trim().to_lowercase().as_str() {
            "tech" => Some(Topic::Tech),
            "sports" => Some(Topic::Sports),
            "entertainment" => Some(Topic::Entertainment),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Topic::Tech => "Tech News",
            Topic::Sports => "Sports Update",
            Topic::Entertainment => "Entertainment Buzz",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Topic::Tech => "The latest releases, launches and breakthroughs from the tech world.",
            Topic::Sports => "Scores, highlights and stories from this week in sports.",
            Topic::Entertainment => "What's new in movies, music and streaming.",
        }
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        match self {
            Topic::Tech => "tech",
            Topic::Sports => "sports",
            Topic::Entertainment => "entertainment",
        }
    }
}

/// Topic tags exactly as the subscriber sent them. Order and duplicates are kept as is,
/// tags outside the catalog are stored but never render a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Preferences(Vec<String>);

impl Preferences {
    pub fn new(tags: Vec<String>) -> Self {
        Self(tags)
    }

    pub fn tags(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Catalog topics the subscriber follows, in catalog order and without repetitions.
    pub fn topics(&self) -> Vec<Topic> {
        let selected: Vec<Topic> = self.0.iter().filter_map(|tag| Topic::parse(tag)).collect();

        TOPIC_CATALOG
            .iter()
            .copied()
            .filter(|topic| selected.contains(topic))
            .collect()
    }
}
