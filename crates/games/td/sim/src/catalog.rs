//! Factories that turn stat tables into fresh entities, and the per-kind upgrade rules.

use crate::config::{EnemyTier, Modifier, TierStats, TowerKind, TowerSpec};
use crate::world::{Enemy, EnemyId, Projectile, ProjectileKind, Tile, Tower, TowerId};
use glam::Vec2;

const RAPID_DAMAGE_GROWTH: f32 = 1.22;
const RAPID_RANGE_STEP: f32 = 10.0;
const SPLASH_DAMAGE_GROWTH: f32 = 1.25;
const SPLASH_RADIUS_STEP: f32 = 6.0;
const FROST_SLOW_STEP: f32 = 0.05;
const FROST_SLOW_CAP: f32 = 0.70;
const FROST_DURATION_STEP: f32 = 0.2;
const FROST_RANGE_STEP: f32 = 8.0;
const SNIPER_DAMAGE_GROWTH: f32 = 1.30;

impl Enemy {
    /// Fresh enemy of `tier`, sitting at the start of the path.
    pub fn spawn(tier: EnemyTier, stats: &TierStats, radius: f32, start: Vec2) -> Self {
        Self {
            tier,
            pos: start,
            base_speed: stats.speed,
            speed: stats.speed,
            hp: stats.hp,
            max_hp: stats.hp,
            radius,
            path_t: 0.0,
            reward: stats.reward,
            immune_slow: stats.immune_slow,
            slow: None,
        }
    }
}

impl Tower {
    /// Level-1 tower ready to fire immediately.
    pub fn build(kind: TowerKind, spec: &TowerSpec, tile: Tile, pos: Vec2) -> Self {
        Self {
            kind,
            tile,
            pos,
            range: spec.range,
            fire_rate: spec.fire_rate,
            cooldown: 0.0,
            projectile_speed: spec.projectile_speed,
            damage: spec.damage,
            level: 1,
            modifier: spec.modifier,
        }
    }

    /// Copy of this tower one level higher. `spec` supplies the fire-rate growth.
    pub fn upgraded(&self, spec: &TowerSpec) -> Tower {
        let mut next = self.clone();
        next.level = self.level + 1;
        next.fire_rate = round_rate(self.fire_rate * spec.rate_growth);

        match self.kind {
            TowerKind::Rapid => {
                next.damage = grow(self.damage, RAPID_DAMAGE_GROWTH);
                next.range = self.range + RAPID_RANGE_STEP;
            }
            TowerKind::Splash => {
                next.damage = grow(self.damage, SPLASH_DAMAGE_GROWTH);
                if let Modifier::Splash { radius } = self.modifier {
                    next.modifier = Modifier::Splash {
                        radius: radius + SPLASH_RADIUS_STEP,
                    };
                }
            }
            TowerKind::Frost => {
                if let Modifier::Slow { pct, duration } = self.modifier {
                    next.modifier = Modifier::Slow {
                        pct: (pct + FROST_SLOW_STEP).clamp(0.0, FROST_SLOW_CAP),
                        duration: duration + FROST_DURATION_STEP,
                    };
                }
                next.range = self.range + FROST_RANGE_STEP;
            }
            TowerKind::Sniper => {
                next.damage = grow(self.damage, SNIPER_DAMAGE_GROWTH);
            }
        }

        next
    }

    pub fn projectile_kind(&self) -> ProjectileKind {
        if self.kind.ignores_range() {
            return ProjectileKind::Instant;
        }
        match self.modifier {
            Modifier::None => ProjectileKind::Single,
            Modifier::Splash { radius } => ProjectileKind::Splash { radius },
            Modifier::Slow { pct, duration } => ProjectileKind::Slow { pct, duration },
        }
    }

    /// Projectile leaving this tower toward `target`, carrying its current stats.
    pub fn fire_at(&self, source: TowerId, target: EnemyId) -> Projectile {
        Projectile {
            kind: self.projectile_kind(),
            pos: self.pos,
            target,
            source,
            speed: self.projectile_speed,
            damage: self.damage,
            alive: true,
        }
    }
}

fn grow(damage: i32, factor: f32) -> i32 {
    (damage as f32 * factor).round() as i32
}

/// Fire rates are kept to two decimals.
fn round_rate(rate: f64) -> f64 {
    (rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TdConfig;

    fn spec(kind: TowerKind) -> TowerSpec {
        TdConfig::default().tower_spec(kind).clone()
    }

    fn tower(kind: TowerKind) -> Tower {
        let config = TdConfig::default();
        Tower::build(kind, config.tower_spec(kind), Tile::new(0, 0), Vec2::ZERO)
    }

    #[test]
    fn enemy_spawns_from_tier_table() {
        let config = TdConfig::default();
        let start = Vec2::new(28.0, 140.0);
        let e = Enemy::spawn(
            EnemyTier::Yellow,
            config.tier_stats(EnemyTier::Yellow),
            config.enemy_radius,
            start,
        );
        assert_eq!(e.hp, 110);
        assert_eq!(e.max_hp, 110);
        assert_eq!(e.speed, 110.0);
        assert_eq!(e.base_speed, 110.0);
        assert_eq!(e.reward, 8);
        assert!(e.immune_slow);
        assert_eq!(e.pos, start);
        assert_eq!(e.path_t, 0.0);
        assert!(e.slow.is_none());
    }

    #[test]
    fn new_tower_is_level_one_and_ready() {
        let t = tower(TowerKind::Splash);
        assert_eq!(t.level, 1);
        assert_eq!(t.cooldown, 0.0);
        assert_eq!(t.damage, 20);
        assert_eq!(t.modifier, Modifier::Splash { radius: 64.0 });
    }

    #[test]
    fn rapid_upgrade() {
        let t = tower(TowerKind::Rapid).upgraded(&spec(TowerKind::Rapid));
        assert_eq!(t.level, 2);
        assert_eq!(t.damage, 20); // 16 * 1.22 = 19.52
        assert_eq!(t.range, 180.0);
        assert_eq!(t.fire_rate, 1.6);
    }

    #[test]
    fn rate_growth_comes_from_the_spec() {
        let mut fast = spec(TowerKind::Rapid);
        fast.rate_growth = 1.1;
        let t = tower(TowerKind::Rapid).upgraded(&fast).upgraded(&fast);
        assert_eq!(t.level, 3);
        // 1.6 * 1.1 = 1.76, then 1.936 -> 1.94
        assert!((t.fire_rate - 1.94).abs() < 1e-9);
        assert_eq!(t.range, 190.0);
    }

    #[test]
    fn splash_upgrade() {
        let t = tower(TowerKind::Splash).upgraded(&spec(TowerKind::Splash));
        assert_eq!(t.damage, 25);
        assert_eq!(t.modifier, Modifier::Splash { radius: 70.0 });
        assert!((t.fire_rate - 0.95).abs() < 1e-6); // 0.945 rounds up
        assert_eq!(t.range, 150.0);
    }

    #[test]
    fn frost_upgrade_caps_slow() {
        let frost = spec(TowerKind::Frost);
        let mut t = tower(TowerKind::Frost);
        for _ in 0..10 {
            t = t.upgraded(&frost);
        }
        assert_eq!(t.level, 11);
        assert_eq!(t.damage, 8);
        assert_eq!(t.range, 220.0);
        let Modifier::Slow { pct, duration } = t.modifier else {
            panic!("frost tower lost its slow");
        };
        assert_eq!(pct, FROST_SLOW_CAP);
        assert!((duration - 3.8).abs() < 1e-4);
    }

    #[test]
    fn sniper_upgrade() {
        let t = tower(TowerKind::Sniper).upgraded(&spec(TowerKind::Sniper));
        assert_eq!(t.damage, 62); // 48 * 1.3 = 62.4
        assert!((t.fire_rate - 0.76).abs() < 1e-6);
    }

    #[test]
    fn projectile_kind_follows_tower_kind() {
        assert_eq!(tower(TowerKind::Rapid).projectile_kind(), ProjectileKind::Single);
        assert_eq!(tower(TowerKind::Sniper).projectile_kind(), ProjectileKind::Instant);
        assert_eq!(
            tower(TowerKind::Splash).projectile_kind(),
            ProjectileKind::Splash { radius: 64.0 }
        );
        assert_eq!(
            tower(TowerKind::Frost).projectile_kind(),
            ProjectileKind::Slow {
                pct: 0.35,
                duration: 1.8,
            }
        );
    }
}
