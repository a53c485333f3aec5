//! Target-sum basket generation.
//!
//! Given a menu and a pre-tax revenue figure, synthesize a plausible delivery
//! order whose weighted sum matches the figure: a bounded randomized search
//! over price-appropriate menu subsets, with the cheapest chosen item
//! absorbing the residual. Pure over the supplied RNG, so a fixed seed
//! reproduces the basket exactly.

use hoadon_core::{CatalogItem, LineItem};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::reclassify::is_alcoholic;

/// Menus under this size get wider pools and trimmed item counts.
const SMALL_MENU: usize = 150;
/// Acceptance tolerance on the basket total.
const EXACT_EPS: f64 = 0.01;
/// Generated unit prices never drop below this.
const PRICE_FLOOR: f64 = 1_000.0;
/// Main-dish categories a delivery order should always represent.
const MAIN_DISH_MARKERS: [&str; 2] = ["taco", "burrito"];

/// Item-count bounds and attempt budget for a target amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    pub min_items: usize,
    pub max_items: usize,
    pub attempts: usize,
}

pub fn search_bounds(target: f64, menu_size: usize) -> SearchBounds {
    let small = menu_size < SMALL_MENU;
    let (min_items, max_items, attempts) = if target > 5_000_000.0 {
        if small {
            (20, 30.min(menu_size.saturating_sub(5)), 200)
        } else {
            (25, 40.min(menu_size), 200)
        }
    } else if target > 2_000_000.0 {
        if small {
            (18, 28.min(menu_size.saturating_sub(5)), 100)
        } else {
            (20, 35, 100)
        }
    } else if small {
        (18, 25.min(menu_size.saturating_sub(5)), 50)
    } else {
        (20, 30, 50)
    };
    SearchBounds {
        min_items,
        max_items: max_items.max(min_items),
        attempts: attempts * 5,
    }
}

/// Largest unit-price shift permitted on the single adjustable item.
pub fn max_price_adjustment(target: f64) -> f64 {
    if target > 9_000_000.0 {
        (target * 0.02).min(200_000.0)
    } else if target > 5_000_000.0 {
        (target * 0.015).min(100_000.0)
    } else if target > 2_000_000.0 {
        (target * 0.01).min(50_000.0)
    } else if target > 1_000_000.0 {
        30_000.0
    } else {
        10_000.0
    }
}

/// A generated basket. `deviation` is |total − target|; `exact` means the
/// acceptance tolerance was met with the price shift in bound — otherwise the
/// basket is the closest effort found and the deviation must be surfaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedBasket {
    pub items: Vec<LineItem>,
    pub total: f64,
    pub deviation: f64,
    /// (name, catalog price, generated price) when one item's price shifted.
    pub adjusted: Option<(String, f64, f64)>,
    pub exact: bool,
}

struct Attempt {
    items: Vec<LineItem>,
    total: f64,
    deviation: f64,
    adjusted: Option<(String, f64, f64)>,
    within_bound: bool,
}

/// Synthesize a basket whose pre-tax total matches `target`.
///
/// Alcoholic entries are excluded outright. Returns `None` only for an empty
/// (post-exclusion) menu or a non-positive target; otherwise always yields the
/// exact or closest-effort basket.
pub fn generate_basket(
    menu: &[CatalogItem],
    target: f64,
    rng: &mut StdRng,
) -> Option<GeneratedBasket> {
    let pool: Vec<&CatalogItem> = menu.iter().filter(|i| !is_alcoholic(&i.name)).collect();
    if pool.is_empty() || target <= 0.0 {
        return None;
    }

    let bounds = search_bounds(target, pool.len());
    let max_adj = max_price_adjustment(target);

    // Representative mains, chosen once and kept across attempts.
    let mut required: Vec<&CatalogItem> = Vec::new();
    for marker in MAIN_DISH_MARKERS {
        let dishes: Vec<&CatalogItem> = pool
            .iter()
            .copied()
            .filter(|i| i.name.to_lowercase().contains(marker))
            .collect();
        if let Some(pick) = dishes.choose(rng) {
            if !required.iter().any(|r| r.name == pick.name) {
                required.push(pick);
            }
        }
    }

    let mut best: Option<Attempt> = None;
    for _ in 0..bounds.attempts {
        let Some(attempt) = run_attempt(&pool, &required, target, &bounds, max_adj, rng) else {
            continue;
        };
        let best_dev = best.as_ref().map(|b| b.deviation).unwrap_or(f64::INFINITY);
        if attempt.within_bound {
            let done = attempt.deviation < EXACT_EPS;
            if attempt.deviation < best_dev {
                best = Some(attempt);
            }
            if done {
                break;
            }
        } else if best.is_none() || (best_dev > 50_000.0 && attempt.deviation < best_dev) {
            best = Some(attempt);
        }
    }

    best.map(|a| GeneratedBasket {
        exact: a.within_bound && a.deviation < EXACT_EPS,
        items: a.items,
        total: a.total,
        deviation: a.deviation,
        adjusted: a.adjusted,
    })
}

fn run_attempt(
    pool: &[&CatalogItem],
    required: &[&CatalogItem],
    target: f64,
    bounds: &SearchBounds,
    max_adj: f64,
    rng: &mut StdRng,
) -> Option<Attempt> {
    let n_required = required.len();
    let low = bounds.min_items.saturating_sub(n_required).max(1);
    let high = bounds.max_items.saturating_sub(n_required).max(low);
    let n_extra = rng.gen_range(low..=high);

    let available: Vec<&CatalogItem> = pool
        .iter()
        .copied()
        .filter(|i| !required.iter().any(|r| r.name == i.name))
        .collect();
    if available.is_empty() {
        return None;
    }

    let extra = pick_extra(&available, n_extra, target, n_required, rng);

    let mut chosen: Vec<&CatalogItem> = required.to_vec();
    chosen.extend(extra);
    chosen.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(std::cmp::Ordering::Equal));

    let count = chosen.len();
    let avg_price = chosen.iter().map(|i| i.price).sum::<f64>() / count as f64;
    let est_avg_qty = target / (count as f64 * avg_price);
    let default_max_qty: u32 = if count >= 20 {
        ((est_avg_qty * 1.5) as u32).clamp(2, 5)
    } else {
        9
    };

    let mut items: Vec<LineItem> = Vec::with_capacity(count);
    let mut adjusted = None;
    let mut remaining = target;

    for (i, entry) in chosen.iter().enumerate() {
        if i + 1 == count {
            // Cheapest item absorbs the residual.
            let (quantity, price) = close_residual(entry.price, remaining, max_adj);
            if (price - entry.price).abs() > EXACT_EPS {
                adjusted = Some((entry.name.clone(), entry.price, price));
            }
            items.push(LineItem {
                name: entry.name.clone(),
                quantity,
                unit: entry.unit.clone(),
                price,
            });
        } else {
            let items_left = (count - i) as f64;
            let target_qty = (remaining / items_left) / entry.price;
            let max_qty = ((target_qty * 2.0) as u32).max(1).min(default_max_qty);
            let max_affordable = max_qty.min((remaining / entry.price) as u32);
            let quantity = if max_affordable >= 1 {
                if target_qty >= 1.0 {
                    max_affordable.min((target_qty as u32).max(1))
                } else {
                    max_affordable.min(rng.gen_range(1..=2))
                }
            } else {
                1
            };
            remaining -= quantity as f64 * entry.price;
            items.push(LineItem {
                name: entry.name.clone(),
                quantity,
                unit: entry.unit.clone(),
                price: entry.price,
            });
        }
    }

    let total: f64 = items.iter().map(LineItem::subtotal).sum();
    let last_catalog_price = chosen.last()?.price;
    let last_price = items.last()?.price;
    Some(Attempt {
        total,
        deviation: (target - total).abs(),
        adjusted,
        within_bound: (last_price - last_catalog_price).abs() <= max_adj,
        items,
    })
}

/// Sample the non-required picks from a price-appropriate slice of the menu:
/// expensive items for large targets, a band around the per-item share for
/// mid-range targets, cheap items otherwise.
fn pick_extra<'a>(
    available: &[&'a CatalogItem],
    n_extra: usize,
    target: f64,
    n_required: usize,
    rng: &mut StdRng,
) -> Vec<&'a CatalogItem> {
    let small = available.len() + n_required < SMALL_MENU;
    let avg_needed = target / (n_extra + n_required) as f64;

    if target > 3_000_000.0 {
        let mut by_price: Vec<&CatalogItem> = available.to_vec();
        by_price.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(std::cmp::Ordering::Equal));
        let pool_size = if small {
            (n_extra * 3).max(available.len() * 7 / 10)
        } else {
            (n_extra * 3).max(available.len() / 2)
        };
        let slice = &by_price[..pool_size.min(by_price.len())];
        if slice.len() < n_extra {
            sample(available, n_extra, rng)
        } else {
            sample(slice, n_extra, rng)
        }
    } else if target > 1_000_000.0 {
        let (lo, hi) = if small { (0.2, 3.0) } else { (0.3, 2.5) };
        let suitable: Vec<&CatalogItem> = available
            .iter()
            .copied()
            .filter(|i| i.price >= avg_needed * lo && i.price <= avg_needed * hi)
            .collect();
        if suitable.len() >= n_extra {
            sample(&suitable, n_extra, rng)
        } else {
            let mut picked = suitable.clone();
            let rest: Vec<&CatalogItem> = available
                .iter()
                .copied()
                .filter(|i| !suitable.iter().any(|s| s.name == i.name))
                .collect();
            picked.extend(sample(&rest, n_extra - picked.len(), rng));
            picked
        }
    } else {
        let mut by_price: Vec<&CatalogItem> = available.to_vec();
        by_price.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));
        let pool_size = if small {
            (n_extra * 2).max(available.len() * 6 / 10)
        } else {
            (n_extra * 3).max(available.len() / 2)
        };
        let slice = &by_price[..pool_size.min(by_price.len())];
        if slice.len() < n_extra {
            sample(available, n_extra, rng)
        } else {
            sample(slice, n_extra, rng)
        }
    }
}

fn sample<'a>(slice: &[&'a CatalogItem], n: usize, rng: &mut StdRng) -> Vec<&'a CatalogItem> {
    slice
        .choose_multiple(rng, n.min(slice.len()))
        .copied()
        .collect()
}

/// Pick the quantity and unit price that close the residual with the final
/// item: the exact integer quantity at catalog price when it lands
/// near-integral, otherwise a bounded price shift at the rounded quantity,
/// searching larger quantities when the rounded one cannot absorb the gap.
fn close_residual(catalog_price: f64, remaining: f64, max_adj: f64) -> (u32, f64) {
    let ideal = remaining / catalog_price;
    if (ideal - ideal.round()).abs() < 1e-4 && ideal.round() >= 1.0 {
        return (ideal.round() as u32, catalog_price);
    }

    let rounded = ideal.round().max(1.0) as u32;
    let per = remaining / rounded as f64;
    if (per - catalog_price).abs() <= max_adj {
        return (rounded, per.max(PRICE_FLOOR));
    }

    let upper = ((remaining / catalog_price) as i64 + 10)
        .min(100)
        .max(rounded as i64 + 1) as u32;
    for qty in rounded + 1..=upper {
        let per = remaining / qty as f64;
        if (per - catalog_price).abs() <= max_adj {
            return (qty, per.max(PRICE_FLOOR));
        }
    }

    // No bounded shift closes the gap; keep the catalog price and let the
    // attempt be judged on its deviation.
    (rounded, catalog_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// A taco-place-sized menu: mains plus sides and drinks across the usual
    /// price range, all multiples of 1,000.
    fn menu() -> Vec<CatalogItem> {
        let mut items = Vec::new();
        let mains = [
            ("Taco Gà / Chicken Taco", 55_000.0),
            ("Taco Bò / Beef Taco", 65_000.0),
            ("Taco Heo / Pork Taco", 60_000.0),
            ("Burrito Gà / Chicken Burrito", 85_000.0),
            ("Burrito Bò / Beef Burrito", 95_000.0),
            ("Quesadilla Gà / Chicken Quesadilla", 90_000.0),
            ("Nachos Phô Mai / Cheese Nachos", 75_000.0),
            ("Cơm Mexico / Mexican Rice Bowl", 70_000.0),
        ];
        for (name, price) in mains {
            items.push(CatalogItem {
                name: name.to_string(),
                unit: "Phần".to_string(),
                price,
                tax_group: "Đồ ăn".to_string(),
                source: "taco-place-menu".to_string(),
            });
        }
        for i in 0..16 {
            items.push(CatalogItem {
                name: format!("Món Phụ {i} / Side Dish {i}"),
                unit: "Phần".to_string(),
                price: 20_000.0 + 5_000.0 * (i % 8) as f64,
                tax_group: "Đồ ăn".to_string(),
                source: "taco-place-menu".to_string(),
            });
        }
        for i in 0..6 {
            items.push(CatalogItem {
                name: format!("Nước Ép {i} / Fresh Juice {i}"),
                unit: "Ly".to_string(),
                price: 15_000.0 + 5_000.0 * (i % 3) as f64,
                tax_group: "Đồ uống".to_string(),
                source: "taco-place-menu".to_string(),
            });
        }
        items.push(CatalogItem {
            name: "Bia Tiger / Tiger Beer".to_string(),
            unit: "Lon".to_string(),
            price: 25_000.0,
            tax_group: "Bia".to_string(),
            source: "taco-place-menu".to_string(),
        });
        items
    }

    #[test]
    fn test_matches_million_target_within_one_unit() {
        // 1,080,000 tax-inclusive at 8% => 1,000,000 pre-tax.
        let target = 1_080_000.0 / 1.08;
        let menu = menu();
        let mut rng = StdRng::seed_from_u64(20_240_315);
        let basket = generate_basket(&menu, target, &mut rng).unwrap();

        assert!(
            basket.deviation <= 1.0,
            "deviation {} too large",
            basket.deviation
        );
        let weighted: f64 = basket.items.iter().map(LineItem::subtotal).sum();
        assert!((weighted - target).abs() <= 1.0);
    }

    #[test]
    fn test_item_count_within_bounds() {
        let target = 1_000_000.0;
        let menu = menu();
        let bounds = search_bounds(target, menu.len() - 1); // minus the beer
        let mut rng = StdRng::seed_from_u64(9);
        let basket = generate_basket(&menu, target, &mut rng).unwrap();
        assert!(
            (bounds.min_items..=bounds.max_items).contains(&basket.items.len()),
            "{} items outside {:?}",
            basket.items.len(),
            bounds
        );
    }

    #[test]
    fn test_at_most_one_price_deviates_within_limit() {
        let target = 1_000_000.0;
        let menu = menu();
        let limit = max_price_adjustment(target);
        let mut rng = StdRng::seed_from_u64(77);
        let basket = generate_basket(&menu, target, &mut rng).unwrap();

        let catalog_price = |name: &str| menu.iter().find(|i| i.name == name).unwrap().price;
        let deviating: Vec<_> = basket
            .items
            .iter()
            .filter(|item| (item.price - catalog_price(&item.name)).abs() > EXACT_EPS)
            .collect();
        assert!(deviating.len() <= 1, "more than one shifted price");
        for item in deviating {
            assert!(
                (item.price - catalog_price(&item.name)).abs() <= limit,
                "shift on {} exceeds {limit}",
                item.name
            );
        }
    }

    #[test]
    fn test_quantities_are_positive_integers() {
        let menu = menu();
        let mut rng = StdRng::seed_from_u64(5);
        let basket = generate_basket(&menu, 2_500_000.0, &mut rng).unwrap();
        assert!(basket.items.iter().all(|i| i.quantity >= 1));
    }

    #[test]
    fn test_excludes_alcohol_and_includes_mains() {
        let menu = menu();
        let mut rng = StdRng::seed_from_u64(13);
        let basket = generate_basket(&menu, 1_500_000.0, &mut rng).unwrap();
        assert!(
            basket.items.iter().all(|i| !is_alcoholic(&i.name)),
            "alcohol must never be generated"
        );
        let lower: Vec<String> = basket.items.iter().map(|i| i.name.to_lowercase()).collect();
        assert!(lower.iter().any(|n| n.contains("taco")));
        assert!(lower.iter().any(|n| n.contains("burrito")));
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let menu = menu();
        let a = generate_basket(&menu, 1_000_000.0, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_basket(&menu, 1_000_000.0, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.items, b.items);
        assert_eq!(a.total, b.total);
    }

    #[test]
    fn test_empty_menu_yields_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_basket(&[], 1_000_000.0, &mut rng).is_none());
    }

    #[test]
    fn test_adjustment_limit_scales_with_target() {
        assert_eq!(max_price_adjustment(800_000.0), 10_000.0);
        assert_eq!(max_price_adjustment(1_500_000.0), 30_000.0);
        assert_eq!(max_price_adjustment(3_000_000.0), 30_000.0);
        assert_eq!(max_price_adjustment(8_000_000.0), 100_000.0);
        assert_eq!(max_price_adjustment(20_000_000.0), 200_000.0);
    }
}
