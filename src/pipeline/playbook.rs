//! Static growth playbook: content calendar, hashtag groups, fallback windows
//!
//! Curated defaults for the pet-fashion account the program grew out of.
//! The advisor serves the fallback windows only for weekdays that lack
//! sample coverage; everything else is read-only reference data for the
//! presentation layer.

use super::types::RecommendedWindow;
use chrono::Weekday;

/// A named group of strategic hashtags
#[derive(Debug, Clone, Copy)]
pub struct HashtagGroup {
    pub title: &'static str,
    pub tags: [&'static str; 5],
}

/// Strategic hashtag groups, by theme
pub fn hashtag_groups() -> [HashtagGroup; 4] {
    [
        HashtagGroup {
            title: "Chilean local",
            tags: [
                "#Santiago",
                "#PerrosChile",
                "#MascotasChile",
                "#ChilePerros",
                "#SantiagoMascotas",
            ],
        },
        HashtagGroup {
            title: "Pet niche",
            tags: [
                "#PerrosFelix",
                "#DogLovers",
                "#PerrosConEstilo",
                "#AmantesDePerros",
                "#PerrosChic",
            ],
        },
        HashtagGroup {
            title: "Dog fashion",
            tags: [
                "#ModaPerruna",
                "#DogFashion",
                "#RopaParaPerros",
                "#EstiloCanino",
                "#PerrosConRopa",
            ],
        },
        HashtagGroup {
            title: "Trending",
            tags: [
                "#PetInfluencer",
                "#DogStyle",
                "#PetFashion",
                "#PerrosFelices",
                "#DogLife",
            ],
        },
    ]
}

/// Planned content slots for a weekday
pub fn content_plan(weekday: Weekday) -> &'static [&'static str] {
    match weekday {
        Weekday::Mon => &["Reel: fashion tips", "Stories: behind the scenes"],
        Weekday::Tue => &["Post: new product", "Carousel: sizing guide"],
        Weekday::Wed => &["Reel: happy customer", "Stories: Q&A"],
        Weekday::Thu => &["Post: promotion", "Stories: poll"],
        Weekday::Fri => &["Reel: tutorial", "Post: user generated"],
        Weekday::Sat => &["Carousel: lookbook", "Stories: event"],
        Weekday::Sun => &["Post: motivational", "Stories: weekly recap"],
    }
}

/// Hand-curated posting windows used when no sample data backs a weekday
///
/// Fallback windows carry score 0.0 to distinguish them from data-driven
/// recommendations.
pub fn default_posting_windows() -> Vec<RecommendedWindow> {
    let mut windows = Vec::new();

    let weekdays = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];
    for weekday in weekdays {
        windows.push(window(weekday, 9, 10));
        windows.push(window(weekday, 13, 14));
        windows.push(window(weekday, 19, 21));
    }

    windows.push(window(Weekday::Sat, 11, 13));
    windows.push(window(Weekday::Sat, 16, 18));

    windows.push(window(Weekday::Sun, 12, 14));
    windows.push(window(Weekday::Sun, 17, 19));

    windows
}

fn window(weekday: Weekday, start_hour: u32, end_hour: u32) -> RecommendedWindow {
    RecommendedWindow {
        weekday,
        start_minute: start_hour * 60,
        end_minute: end_hour * 60,
        score: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_weekday_has_fallback_windows() {
        let windows = default_posting_windows();

        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            assert!(
                windows.iter().any(|w| w.weekday == weekday),
                "no fallback windows for {:?}",
                weekday
            );
        }
    }

    #[test]
    fn test_fallback_windows_are_well_formed() {
        for window in default_posting_windows() {
            assert!(window.start_minute < window.end_minute);
            assert!(window.end_minute <= 24 * 60);
            assert_eq!(window.score, 0.0);
        }
    }

    #[test]
    fn test_content_plan_covers_week() {
        assert_eq!(content_plan(Weekday::Mon).len(), 2);
        assert!(content_plan(Weekday::Sun)[1].contains("recap"));
    }

    #[test]
    fn test_hashtag_groups_have_five_tags() {
        for group in hashtag_groups() {
            assert_eq!(group.tags.len(), 5);
            assert!(group.tags.iter().all(|t| t.starts_with('#')));
        }
    }
}
