//! Hit - one damage value shown as one hitsplat

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hitsplat colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    Blocked,
    Normal,
    Poison,
    Disease,
}

/// A single hit. Construction normalises inconsistent combinations:
/// - negative damage becomes 0
/// - 0 damage of kind `Normal` becomes `Blocked`
/// - a `Blocked` hit always carries 0 damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    damage: i32,
    kind: HitKind,
}

impl Hit {
    pub fn new(damage: i32, kind: HitKind) -> Self {
        let mut damage = damage.max(0);
        let mut kind = kind;
        if damage == 0 && kind == HitKind::Normal {
            kind = HitKind::Blocked;
        }
        if kind == HitKind::Blocked {
            damage = 0;
        }
        Hit { damage, kind }
    }

    /// A `Normal` hit (or `Blocked` if `damage` is 0)
    pub fn normal(damage: i32) -> Self {
        Hit::new(damage, HitKind::Normal)
    }

    pub fn blocked() -> Self {
        Hit::new(0, HitKind::Blocked)
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }

    pub fn kind(&self) -> HitKind {
        self.kind
    }

    pub fn is_blocked(&self) -> bool {
        self.kind == HitKind::Blocked
    }

    /// Same kind with new damage. A blocked hit regains `Normal` if the new
    /// damage is positive.
    pub fn with_damage(self, damage: i32) -> Self {
        let kind = match self.kind {
            HitKind::Blocked => HitKind::Normal,
            kind => kind,
        };
        Hit::new(damage, kind)
    }

    /// Clamp damage to at most `max`
    pub fn capped(self, max: i32) -> Self {
        if self.damage <= max {
            return self;
        }
        Hit::new(max, self.kind)
    }

    /// Multiply damage, rounding down
    pub fn scaled(self, factor: f64) -> Self {
        Hit::new((self.damage as f64 * factor).floor() as i32, self.kind)
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.damage, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_normal_becomes_blocked() {
        let hit = Hit::new(0, HitKind::Normal);
        assert_eq!(hit.kind(), HitKind::Blocked);
    }

    #[test]
    fn test_blocked_with_damage_loses_damage() {
        let hit = Hit::new(12, HitKind::Blocked);
        assert_eq!(hit.damage(), 0);
        assert!(hit.is_blocked());
    }

    #[test]
    fn test_poison_zero_stays_poison() {
        let hit = Hit::new(0, HitKind::Poison);
        assert_eq!(hit.kind(), HitKind::Poison);
    }

    #[test]
    fn test_with_damage_unblocks() {
        let hit = Hit::blocked().with_damage(7);
        assert_eq!(hit.kind(), HitKind::Normal);
        assert_eq!(hit.damage(), 7);
    }

    #[test]
    fn test_capped_and_scaled() {
        let hit = Hit::normal(30);
        assert_eq!(hit.capped(10).damage(), 10);
        assert_eq!(hit.capped(0).kind(), HitKind::Blocked);
        assert_eq!(hit.scaled(0.6).damage(), 18);
        assert_eq!(Hit::normal(1).scaled(0.6).kind(), HitKind::Blocked);
    }

    proptest! {
        #[test]
        fn prop_negative_damage_is_zero(damage in i32::MIN..0) {
            let hit = Hit::new(damage, HitKind::Normal);
            prop_assert_eq!(hit.damage(), 0);
            prop_assert_eq!(hit.kind(), HitKind::Blocked);
        }

        #[test]
        fn prop_blocked_never_carries_damage(damage in 1i32..100_000) {
            prop_assert_eq!(Hit::new(damage, HitKind::Blocked).damage(), 0);
        }

        #[test]
        fn prop_positive_normal_is_kept(damage in 1i32..100_000) {
            let hit = Hit::normal(damage);
            prop_assert_eq!(hit.damage(), damage);
            prop_assert_eq!(hit.kind(), HitKind::Normal);
        }
    }
}
