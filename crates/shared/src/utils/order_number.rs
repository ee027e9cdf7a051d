use anyhow::Result;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng, TryRngCore};

/// External order number: `ORD-<unix millis>-<4 random digits>`.
///
/// Collision probability is negligible but not zero; the unique constraint on
/// `orders.order_number` is the authoritative guard at insert time.
pub fn generate_order_number() -> Result<String> {
    let millis = chrono::Utc::now().timestamp_millis();

    let mut seed = [0u8; 32];
    OsRng.try_fill_bytes(&mut seed)?;
    let mut rng = StdRng::from_seed(seed);
    let suffix: u32 = rng.random_range(1000..10000);

    Ok(format!("ORD-{millis}-{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_has_expected_shape() {
        let number = generate_order_number().unwrap();
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        let suffix = parts[2].parse::<u32>().unwrap();
        assert!((1000..10000).contains(&suffix));
    }

    #[test]
    fn order_numbers_differ_across_calls() {
        let a = generate_order_number().unwrap();
        let b = generate_order_number().unwrap();
        let c = generate_order_number().unwrap();

        // Three draws sharing a millisecond AND a suffix is effectively
        // impossible; two of three may legitimately collide on the timestamp.
        assert!(!(a == b && b == c));
    }
}
