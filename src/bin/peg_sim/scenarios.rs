// Scenario Definitions - the collateral price paths explored by the model
// Each scenario only selects a feed; parameters and horizon come from the run config

use peg_model::PriceFeedConfig;

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub feed: PriceFeedConfig,
}

impl Scenario {
    pub fn matches(&self, filter: &str) -> bool {
        let f = filter.to_lowercase();
        self.name.to_lowercase().contains(&f)
            || self.label.to_lowercase().contains(&f)
            || self.feed.kind().contains(&f)
    }
}

/// Built-in price paths, followed by the feed named in the loaded config.
pub fn scenarios(config_feed: &PriceFeedConfig) -> Vec<Scenario> {
    vec![
        Scenario {
            name: "FLAT",
            label: "Flat collateral",
            feed: PriceFeedConfig::Constant,
        },
        Scenario {
            name: "RANDOM_WALK",
            label: "Random walk with jumps",
            feed: PriceFeedConfig::random_walk(0),
        },
        Scenario {
            name: "OSCILLATING",
            label: "Oscillating 500-520",
            feed: PriceFeedConfig::Oscillating { min: 500.0, magnitude: 10.0 },
        },
        Scenario {
            name: "QUADRATIC",
            label: "Quadratic growth",
            feed: PriceFeedConfig::Quadratic { scale: 10.0 },
        },
        Scenario {
            name: "BULL",
            label: "Linear rally +100/step",
            feed: PriceFeedConfig::LinearIncreasing { gradient: 100.0 },
        },
        Scenario {
            name: "BLEED",
            label: "Linear decline -1/step",
            feed: PriceFeedConfig::LinearDecreasing { gradient: 1.0 },
        },
        Scenario {
            name: "SUBLINEAR",
            label: "Sublinear drift",
            feed: PriceFeedConfig::Sublinear { steepness: 10.0 },
        },
        Scenario {
            name: "CONFIG",
            label: "Feed from config",
            feed: config_feed.clone(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_feeds_are_valid() {
        for s in scenarios(&PriceFeedConfig::default()) {
            assert!(s.feed.validate().is_ok(), "{} has an invalid feed", s.name);
        }
    }

    #[test]
    fn test_filter_matches_name_label_and_kind() {
        let all = scenarios(&PriceFeedConfig::Constant);
        let hits: Vec<_> = all.iter().filter(|s| s.matches("random")).map(|s| s.name).collect();
        assert_eq!(hits, vec!["RANDOM_WALK"]);
        assert!(all.iter().any(|s| s.matches("linear_decreasing")));
        assert!(all.iter().any(|s| s.matches("bull")));
    }
}
