//! High-tax beverage detection and tax-equivalent substitution.
//!
//! Alcohol and sugared cola carry a 10% rate while the materialized output
//! applies a blanket 8%. A substituted dish takes price
//! round(original × 1.10 / 1.08), embedding the extra two points so the
//! customer-facing total stays unchanged once the 8% is applied.

use hoadon_core::{Catalog, CatalogItem, LineItem};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Tax group labels booked at the liquor rate.
const HIGH_TAX_GROUPS: [&str; 5] = ["bia", "rượu", "beer", "wine", "liquor"];

/// Brand and category keywords that mark an alcoholic drink regardless of
/// catalog group.
pub const ALCOHOL_KEYWORDS: [&str; 12] = [
    "bia", "beer", "heineken", "tiger", "saigon", "333", "rượu", "wine",
    "whisky", "vodka", "carlsberg", "craft",
];

/// A cola without a diet qualifier is taxed like alcohol.
const COLA_MARKERS: [&str; 2] = ["cola", "coke"];
const COLA_QUALIFIERS: [&str; 3] = ["light", "zero", "diet"];

/// Price deltas tried, in order, when looking for a similarly priced
/// replacement dish.
const REPLACEMENT_DELTAS: [f64; 9] = [
    0.0, 5_000.0, -5_000.0, 10_000.0, -10_000.0, 15_000.0, -15_000.0, 20_000.0, -20_000.0,
];

pub fn is_alcoholic(name: &str) -> bool {
    let lower = name.to_lowercase();
    ALCOHOL_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn is_sugared_cola(name: &str) -> bool {
    let lower = name.to_lowercase();
    COLA_MARKERS.iter().any(|m| lower.contains(m))
        && !COLA_QUALIFIERS.iter().any(|q| lower.contains(q))
}

fn group_is_high_tax(item: &CatalogItem) -> bool {
    let group = item.tax_group.to_lowercase();
    HIGH_TAX_GROUPS.iter().any(|g| group.contains(g))
}

fn item_is_high_tax(item: &CatalogItem) -> bool {
    is_alcoholic(&item.name) || is_sugared_cola(&item.name) || group_is_high_tax(item)
}

/// Whether a (possibly matched) line-item name needs the high-tax treatment.
pub fn is_high_tax(name: &str, catalog: &Catalog) -> bool {
    is_alcoholic(name)
        || is_sugared_cola(name)
        || catalog.get(name).is_some_and(group_is_high_tax)
}

/// Substitute a high-tax line item with a tax-equivalent dish. Quantity is
/// preserved; only name, unit and price change. Returns whether a
/// substitution happened; an item stays untouched when the catalog has no
/// non-high-tax entry to offer.
pub fn reclassify_item(item: &mut LineItem, catalog: &Catalog, rng: &mut StdRng) -> bool {
    if !is_high_tax(&item.name, catalog) {
        return false;
    }

    let pool: Vec<&CatalogItem> = catalog
        .items()
        .iter()
        .filter(|i| !item_is_high_tax(i))
        .collect();
    if pool.is_empty() {
        return false;
    }

    let replacement = REPLACEMENT_DELTAS
        .iter()
        .find_map(|delta| {
            let target = item.price + delta;
            let bucket: Vec<&CatalogItem> = pool
                .iter()
                .copied()
                .filter(|i| i.price == target)
                .collect();
            bucket.choose(rng).copied()
        })
        .or_else(|| pool.choose(rng).copied());

    match replacement {
        Some(rep) => {
            item.name = rep.name.clone();
            item.unit = rep.unit.clone();
            item.price = (item.price * 1.10 / 1.08).round();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoadon_core::catalog::read_menu;
    use rand::SeedableRng;

    const MENU_CSV: &str = "\
Taco Gà / Chicken Taco,Phần,55000,Đồ ăn
Burrito Bò / Beef Burrito,Phần,95000,Đồ ăn
Khoai Tây Chiên / French Fries,Phần,25000,Đồ ăn
Bia Saigon / Saigon Beer,Lon,25000,Bia
Rượu Vang Đỏ / Red Wine,Chai,320000,Rượu
Coca Cola,Lon,20000,Đồ uống
Coca Cola Light,Lon,20000,Đồ uống
";

    fn catalog() -> Catalog {
        Catalog::new(read_menu(MENU_CSV.as_bytes(), "simple-place-menu").unwrap())
    }

    fn line(name: &str, price: f64) -> LineItem {
        LineItem {
            name: name.to_string(),
            quantity: 1,
            unit: "Lon".to_string(),
            price,
        }
    }

    #[test]
    fn test_detection() {
        let cat = catalog();
        assert!(is_high_tax("Bia Saigon / Saigon Beer", &cat));
        assert!(is_high_tax("Heineken lon", &cat));
        assert!(is_high_tax("Coca Cola", &cat), "sugared cola is high-tax");
        assert!(!is_high_tax("Coca Cola Light", &cat));
        assert!(!is_high_tax("Taco Gà / Chicken Taco", &cat));
    }

    #[test]
    fn test_adjusted_price_embeds_rate_gap() {
        let cat = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        let mut item = line("Bia Saigon / Saigon Beer", 25_000.0);
        assert!(reclassify_item(&mut item, &cat, &mut rng));
        assert_eq!(item.price, 25_463.0, "round(25000 * 1.10 / 1.08)");
    }

    #[test]
    fn test_replacement_is_never_high_tax() {
        let cat = catalog();
        let mut rng = StdRng::seed_from_u64(42);
        for seed in 0..20u64 {
            let mut rng2 = StdRng::seed_from_u64(seed);
            let mut item = line("Rượu Vang Đỏ / Red Wine", 320_000.0);
            assert!(reclassify_item(&mut item, &cat, &mut rng2));
            assert!(
                !is_high_tax(&item.name, &cat),
                "replacement {} is still high-tax",
                item.name
            );
        }
        let mut item = line("Bia Saigon / Saigon Beer", 25_000.0);
        reclassify_item(&mut item, &cat, &mut rng);
        assert!(!is_high_tax(&item.name, &cat));
    }

    #[test]
    fn test_prefers_nearby_price() {
        let cat = catalog();
        // 25,000 has an exact non-alcoholic price peer: the fries.
        let mut rng = StdRng::seed_from_u64(1);
        let mut item = line("Bia Saigon / Saigon Beer", 25_000.0);
        reclassify_item(&mut item, &cat, &mut rng);
        assert_eq!(item.name, "Khoai Tây Chiên / French Fries");
        assert_eq!(item.unit, "Phần");
    }

    #[test]
    fn test_quantity_preserved() {
        let cat = catalog();
        let mut rng = StdRng::seed_from_u64(3);
        let mut item = LineItem {
            name: "Bia Saigon / Saigon Beer".to_string(),
            quantity: 6,
            unit: "Lon".to_string(),
            price: 25_000.0,
        };
        reclassify_item(&mut item, &cat, &mut rng);
        assert_eq!(item.quantity, 6);
    }

    #[test]
    fn test_non_high_tax_untouched() {
        let cat = catalog();
        let mut rng = StdRng::seed_from_u64(5);
        let mut item = line("Taco Gà / Chicken Taco", 55_000.0);
        assert!(!reclassify_item(&mut item, &cat, &mut rng));
        assert_eq!(item.price, 55_000.0);
    }
}
