//! Domain types — orders, users, and the vocabulary of the wizard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many hinged panes a window unit has. Each class is priced differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SashClass {
    Three,
    Four,
    Five,
    SixSeven,
}

impl SashClass {
    pub const ALL: [SashClass; 4] = [Self::Three, Self::Four, Self::Five, Self::SixSeven];

    /// The next class in the fixed per-type questioning order, if any.
    pub fn next(&self) -> Option<SashClass> {
        match self {
            Self::Three => Some(Self::Four),
            Self::Four => Some(Self::Five),
            Self::Five => Some(Self::SixSeven),
            Self::SixSeven => None,
        }
    }

    /// Button token suffix and storage tag (`3`, `4`, `5`, `6_7`).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::SixSeven => "6_7",
        }
    }

    pub fn from_tag(tag: &str) -> Option<SashClass> {
        match tag {
            "3" => Some(Self::Three),
            "4" => Some(Self::Four),
            "5" => Some(Self::Five),
            "6_7" => Some(Self::SixSeven),
            _ => None,
        }
    }

    /// Human-readable label, e.g. `3-sash`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Three => "3-sash",
            Self::Four => "4-sash",
            Self::Five => "5-sash",
            Self::SixSeven => "6-7-sash",
        }
    }
}

impl std::fmt::Display for SashClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Balcony glazing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glazing {
    Standard,
    FloorToCeiling,
}

impl Glazing {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::FloorToCeiling => "floor_to_ceiling",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Glazing> {
        match tag {
            "standard" => Some(Self::Standard),
            "floor_to_ceiling" => Some(Self::FloorToCeiling),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::FloorToCeiling => "floor-to-ceiling",
        }
    }
}

/// Per-class window counts, 0–6 each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SashCounts {
    pub three: u8,
    pub four: u8,
    pub five: u8,
    pub six_seven: u8,
}

impl SashCounts {
    pub fn get(&self, class: SashClass) -> u8 {
        match class {
            SashClass::Three => self.three,
            SashClass::Four => self.four,
            SashClass::Five => self.five,
            SashClass::SixSeven => self.six_seven,
        }
    }

    pub fn set(&mut self, class: SashClass, count: u8) {
        match class {
            SashClass::Three => self.three = count,
            SashClass::Four => self.four = count,
            SashClass::Five => self.five = count,
            SashClass::SixSeven => self.six_seven = count,
        }
    }
}

/// Window configuration for an order.
///
/// The "same" path leaves exactly one class populated; the "different" path
/// records an independent count for every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowConfig {
    Same { class: SashClass, count: u8 },
    Different { counts: SashCounts },
}

impl WindowConfig {
    /// Flatten into per-class counts. Both paths price identically through this.
    pub fn counts(&self) -> SashCounts {
        match *self {
            Self::Same { class, count } => {
                let mut counts = SashCounts::default();
                counts.set(class, count);
                counts
            }
            Self::Different { counts } => counts,
        }
    }

    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same { .. })
    }

    /// The uniform sash class, when the "same" path was taken.
    pub fn same_class(&self) -> Option<SashClass> {
        match self {
            Self::Same { class, .. } => Some(*class),
            Self::Different { .. } => None,
        }
    }
}

/// Balcony configuration for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Balcony {
    None,
    Glazed {
        count: u8,
        glazing: Glazing,
        sash: SashClass,
    },
}

impl Balcony {
    pub fn count(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Glazed { count, .. } => *count,
        }
    }
}

/// Contact nickname answer — either provided or explicitly skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nickname {
    Skipped,
    Provided(String),
}

impl Nickname {
    pub fn as_option(&self) -> Option<&str> {
        match self {
            Self::Skipped => None,
            Self::Provided(nick) => Some(nick),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
    NeedsClarification,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::NeedsClarification => "needs_clarification",
            Self::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<OrderStatus> {
        match s {
            "confirmed" => Some(Self::Confirmed),
            "needs_clarification" => Some(Self::NeedsClarification),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved order, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: i64,
    pub entrance: u8,
    pub floor: u8,
    pub apartment: String,
    pub windows: WindowConfig,
    pub balcony: Balcony,
    pub nickname: Option<String>,
    pub price: i64,
}

/// An order as stored, joined with its user for export.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: i64,
    pub user_id: i64,
    pub entrance: u8,
    pub floor: u8,
    pub apartment: String,
    pub windows_same: bool,
    pub counts: SashCounts,
    pub balcony: Balcony,
    pub nickname: Option<String>,
    pub price: i64,
    pub status: OrderStatus,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub user: User,
}

/// A Telegram user, upserted on every interaction start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub telegram_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// The order being assembled over the conversation.
///
/// Every field starts unset; the engine fills them in step by step and
/// [`OrderDraft::finalize`] turns the draft into a [`NewOrder`] once the
/// wizard reaches confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: i64,
    pub entrance: Option<u8>,
    pub floor: Option<u8>,
    pub apartment: Option<String>,
    /// Sash class chosen on the "same" path, pending its count.
    pub same_class: Option<SashClass>,
    /// Counts accumulated on the "different" path.
    pub diff_counts: SashCounts,
    pub windows: Option<WindowConfig>,
    pub balcony_count: Option<u8>,
    pub balcony_glazing: Option<Glazing>,
    pub balcony_sash: Option<SashClass>,
    pub nickname: Option<Nickname>,
}

impl OrderDraft {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Resolve the balcony fields into a [`Balcony`], if they are complete.
    pub fn balcony(&self) -> Option<Balcony> {
        match self.balcony_count? {
            0 => Some(Balcony::None),
            count => Some(Balcony::Glazed {
                count,
                glazing: self.balcony_glazing?,
                sash: self.balcony_sash?,
            }),
        }
    }

    /// Convert into a persistable order. Returns `None` if any required
    /// field is still unset; the engine only calls this at the terminal step.
    pub fn finalize(&self, price: i64) -> Option<NewOrder> {
        Some(NewOrder {
            user_id: self.user_id,
            entrance: self.entrance?,
            floor: self.floor?,
            apartment: self.apartment.clone()?,
            windows: self.windows?,
            balcony: self.balcony()?,
            nickname: self.nickname.clone()?.as_option().map(String::from),
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sash_class_walk_covers_all_classes() {
        let mut current = SashClass::Three;
        let mut seen = vec![current];
        while let Some(next) = current.next() {
            seen.push(next);
            current = next;
        }
        assert_eq!(seen, SashClass::ALL);
    }

    #[test]
    fn sash_class_tag_roundtrip() {
        for class in SashClass::ALL {
            assert_eq!(SashClass::from_tag(class.tag()), Some(class));
        }
        assert_eq!(SashClass::from_tag("2"), None);
    }

    #[test]
    fn same_config_populates_one_class() {
        let config = WindowConfig::Same {
            class: SashClass::Five,
            count: 2,
        };
        let counts = config.counts();
        assert_eq!(counts.five, 2);
        assert_eq!(counts.three + counts.four + counts.six_seven, 0);
    }

    #[test]
    fn status_roundtrip() {
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::NeedsClarification,
            OrderStatus::Canceled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("pending"), None);
    }

    #[test]
    fn draft_finalize_requires_all_fields() {
        let mut draft = OrderDraft::new(10);
        assert!(draft.finalize(0).is_none());

        draft.entrance = Some(2);
        draft.floor = Some(10);
        draft.apartment = Some("305".into());
        draft.windows = Some(WindowConfig::Same {
            class: SashClass::Four,
            count: 3,
        });
        draft.balcony_count = Some(0);
        assert!(draft.finalize(4500).is_none(), "nickname still unanswered");

        draft.nickname = Some(Nickname::Skipped);
        let order = draft.finalize(4500).unwrap();
        assert_eq!(order.price, 4500);
        assert_eq!(order.balcony, Balcony::None);
        assert_eq!(order.nickname, None);
    }

    #[test]
    fn draft_balcony_requires_glazing_and_sash_when_positive() {
        let mut draft = OrderDraft::new(1);
        draft.balcony_count = Some(2);
        assert_eq!(draft.balcony(), None);

        draft.balcony_glazing = Some(Glazing::FloorToCeiling);
        draft.balcony_sash = Some(SashClass::Three);
        assert_eq!(
            draft.balcony(),
            Some(Balcony::Glazed {
                count: 2,
                glazing: Glazing::FloorToCeiling,
                sash: SashClass::Three,
            })
        );
    }
}
