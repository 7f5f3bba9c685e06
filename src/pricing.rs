//! Pricing calculator — pure function from order configuration to total cost.
//!
//! Flat per-sash-class schedule. An earlier floor-based multiplier model is
//! superseded: the floor never affects the price.

use crate::error::PricingError;
use crate::models::{Balcony, Glazing, OrderDraft, SashClass, WindowConfig};

/// Unit price per window, by sash class (currency units).
pub fn window_unit_price(class: SashClass) -> i64 {
    match class {
        SashClass::Three => 1000,
        SashClass::Four => 1500,
        SashClass::Five => 2000,
        SashClass::SixSeven => 2500,
    }
}

/// Floor-to-ceiling glazing surcharge per balcony.
const FLOOR_TO_CEILING_SURCHARGE: i64 = 500;

/// Unit price per balcony, by sash class and glazing style.
///
/// Follows the window schedule, with floor-to-ceiling always +500 over
/// standard within the same class.
pub fn balcony_unit_price(sash: SashClass, glazing: Glazing) -> i64 {
    let surcharge = match glazing {
        Glazing::Standard => 0,
        Glazing::FloorToCeiling => FLOOR_TO_CEILING_SURCHARGE,
    };
    window_unit_price(sash) + surcharge
}

/// Total price for a resolved window + balcony configuration.
pub fn total(windows: WindowConfig, balcony: Balcony) -> i64 {
    let counts = windows.counts();
    let windows_total: i64 = SashClass::ALL
        .iter()
        .map(|&class| i64::from(counts.get(class)) * window_unit_price(class))
        .sum();

    let balcony_total = match balcony {
        Balcony::None => 0,
        Balcony::Glazed {
            count,
            glazing,
            sash,
        } => i64::from(count) * balcony_unit_price(sash, glazing),
    };

    windows_total + balcony_total
}

/// Price an in-progress draft.
///
/// Fails if the draft has not resolved every required count — the engine
/// guarantees this never happens by only pricing at the terminal step.
pub fn price_draft(draft: &OrderDraft) -> Result<i64, PricingError> {
    let windows = draft.windows.ok_or(PricingError::MissingWindows)?;
    let balcony = match draft.balcony_count {
        None => {
            return Err(PricingError::IncompleteBalcony(
                "balcony count unanswered".into(),
            ));
        }
        Some(0) => Balcony::None,
        Some(count) => Balcony::Glazed {
            count,
            glazing: draft.balcony_glazing.ok_or_else(|| {
                PricingError::IncompleteBalcony("glazing unanswered".into())
            })?,
            sash: draft.balcony_sash.ok_or_else(|| {
                PricingError::IncompleteBalcony("sash class unanswered".into())
            })?,
        },
    };
    Ok(total(windows, balcony))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SashCounts;

    #[test]
    fn same_path_three_four_sash_windows() {
        // entrance=2, floor=10, apartment=305, 4-sash, count=3, no balcony
        let price = total(
            WindowConfig::Same {
                class: SashClass::Four,
                count: 3,
            },
            Balcony::None,
        );
        assert_eq!(price, 4500);
    }

    #[test]
    fn different_path_with_standard_balcony() {
        // counts {3:1, 4:0, 5:2, 6-7:0}, one 5-sash standard balcony
        let price = total(
            WindowConfig::Different {
                counts: SashCounts {
                    three: 1,
                    four: 0,
                    five: 2,
                    six_seven: 0,
                },
            },
            Balcony::Glazed {
                count: 1,
                glazing: Glazing::Standard,
                sash: SashClass::Five,
            },
        );
        assert_eq!(price, 1000 + 2 * 2000 + 2000);
    }

    #[test]
    fn same_and_different_paths_price_identically() {
        for class in SashClass::ALL {
            for count in 0..=6u8 {
                let mut counts = SashCounts::default();
                counts.set(class, count);
                let same = total(WindowConfig::Same { class, count }, Balcony::None);
                let different = total(WindowConfig::Different { counts }, Balcony::None);
                assert_eq!(same, different, "class {class} count {count}");
            }
        }
    }

    #[test]
    fn windows_price_is_sum_over_classes() {
        let counts = SashCounts {
            three: 2,
            four: 1,
            five: 3,
            six_seven: 1,
        };
        let expected = 2 * 1000 + 1500 + 3 * 2000 + 2500;
        assert_eq!(
            total(WindowConfig::Different { counts }, Balcony::None),
            expected
        );
    }

    #[test]
    fn floor_to_ceiling_adds_fixed_surcharge_per_class() {
        for sash in SashClass::ALL {
            assert_eq!(
                balcony_unit_price(sash, Glazing::FloorToCeiling),
                balcony_unit_price(sash, Glazing::Standard) + 500
            );
        }
    }

    #[test]
    fn balcony_count_multiplies_unit_price() {
        let windows = WindowConfig::Different {
            counts: SashCounts::default(),
        };
        let price = total(
            windows,
            Balcony::Glazed {
                count: 3,
                glazing: Glazing::FloorToCeiling,
                sash: SashClass::Three,
            },
        );
        assert_eq!(price, 3 * 1500);
    }

    #[test]
    fn draft_pricing_fails_mid_flow() {
        let mut draft = OrderDraft::new(1);
        assert!(matches!(
            price_draft(&draft),
            Err(PricingError::MissingWindows)
        ));

        draft.windows = Some(WindowConfig::Same {
            class: SashClass::Three,
            count: 1,
        });
        assert!(matches!(
            price_draft(&draft),
            Err(PricingError::IncompleteBalcony(_))
        ));

        draft.balcony_count = Some(1);
        assert!(matches!(
            price_draft(&draft),
            Err(PricingError::IncompleteBalcony(_))
        ));

        draft.balcony_glazing = Some(Glazing::Standard);
        draft.balcony_sash = Some(SashClass::Three);
        assert_eq!(price_draft(&draft).unwrap(), 1000 + 1000);
    }
}
