//! Energy and mass economy
//!
//! Energy is earned by moving and spent on bullets. It also sets a player's
//! size, and that size doubles as collision mass. Missing health feeds a
//! comeback factor that speeds up energy gain and strengthens the weapon.

/// Radius gained per unit of energy
pub const RADIUS_PER_ENERGY: f32 = 1.2;

/// Player radius (and collision mass) for a given energy
#[inline]
pub fn effective_radius(minimum_radius: f32, energy: f32) -> f32 {
    minimum_radius + energy.max(0.0) * RADIUS_PER_ENERGY
}

/// Largest energy whose radius still fits within `maximum_radius`
#[inline]
pub fn energy_cap(minimum_radius: f32, maximum_radius: f32) -> f32 {
    ((maximum_radius - minimum_radius) / RADIUS_PER_ENERGY).max(0.0)
}

/// Catch-up multiplier in [0, strength], zero at full health
pub fn comeback_factor(health: u32, starting_health: u32, strength: f32) -> f32 {
    if starting_health == 0 {
        return 0.0;
    }
    let missing = 1.0 - health as f32 / starting_health as f32;
    (strength * missing).clamp(0.0, strength.max(0.0))
}

/// Energy earned for moving `distance` this tick
///
/// The divisor grows with current energy, so growth slows as a player gets
/// bigger.
#[inline]
pub fn energy_gain(distance: f32, energy: f32, comeback: f32) -> f32 {
    distance.max(0.0) * (1.0 + comeback) / (2.0 * energy.max(0.0) + 1.0)
}

/// Debit `amount`, clamping at zero
#[inline]
pub fn spend(energy: &mut f32, amount: f32) {
    *energy = (*energy - amount).max(0.0);
}

/// Number of bullets of `cost` each that `budget` energy pays for
#[inline]
pub fn affordable(budget: f32, cost: f32) -> usize {
    if cost <= 0.0 || !budget.is_finite() || budget <= 0.0 {
        return 0;
    }
    (budget / cost) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_grows_with_energy() {
        assert_eq!(effective_radius(30.0, 0.0), 30.0);
        assert!((effective_radius(30.0, 10.0) - 42.0).abs() < 1e-5);
        // Negative drift never shrinks a player below the minimum
        assert_eq!(effective_radius(30.0, -5.0), 30.0);
    }

    #[test]
    fn test_energy_cap_matches_radius() {
        let cap = energy_cap(30.0, 450.0);
        assert!((effective_radius(30.0, cap) - 450.0).abs() < 1e-3);
        // Minimum already too large for the space: no energy at all
        assert_eq!(energy_cap(500.0, 450.0), 0.0);
    }

    #[test]
    fn test_comeback_factor_bounds() {
        assert_eq!(comeback_factor(30, 30, 1.5), 0.0);
        assert!((comeback_factor(15, 30, 1.5) - 0.75).abs() < 1e-6);
        assert!((comeback_factor(0, 30, 1.5) - 1.5).abs() < 1e-6);
        // Health above the start value clamps to zero
        assert_eq!(comeback_factor(40, 30, 1.5), 0.0);
    }

    #[test]
    fn test_energy_gain_self_damping() {
        let low = energy_gain(10.0, 0.0, 0.0);
        let high = energy_gain(10.0, 20.0, 0.0);
        assert!((low - 10.0).abs() < 1e-6);
        assert!(high < low / 10.0);

        // Comeback boosts gain
        assert!(energy_gain(10.0, 5.0, 1.0) > energy_gain(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_spend_floors_at_zero() {
        let mut energy = 4.0;
        spend(&mut energy, 3.0);
        assert!((energy - 1.0).abs() < 1e-6);
        spend(&mut energy, 3.0);
        assert_eq!(energy, 0.0);
    }

    #[test]
    fn test_affordable() {
        assert_eq!(affordable(10.0, 3.0), 3);
        assert_eq!(affordable(2.9, 3.0), 0);
        assert_eq!(affordable(0.0, 3.0), 0);
        assert_eq!(affordable(f32::NAN, 3.0), 0);
    }
}
