//! Distance ordering of incidents around a query point.
//!
//! Sorting uses a randomized quicksort: a Fisher-Yates shuffle seeded from
//! the wall clock, followed by Hoare partitioning with the first element of
//! each sub-range as pivot. The shuffle only affects pivot choice, never the
//! final order of distinct distances. The sort is not stable; incidents at
//! equal distance may come out in any relative order.
//!
//! Each distance is computed exactly once per incident and carried next to
//! it as a [`NearbyIncident`], so comparisons never recompute geometry and
//! never read state left behind by an earlier query.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo::Coordinate;
use crate::model::{Incident, NearbyIncident};

/// Pair each incident with its distance to `origin` and order them nearest
/// first.
pub fn rank_by_distance<I>(incidents: I, origin: Coordinate) -> Vec<NearbyIncident>
where
    I: IntoIterator<Item = Incident>,
{
    let mut ranked: Vec<NearbyIncident> = incidents
        .into_iter()
        .map(|incident| NearbyIncident {
            distance_km: incident.distance_to(origin),
            incident,
        })
        .collect();

    let mut rng = clock_seeded_rng();
    quicksort_by_key(&mut ranked, &mut rng, |nearby| nearby.distance_km);
    ranked
}

/// Reorder `incidents` in place, ascending by distance to `origin`.
pub fn sort_by_distance(incidents: &mut Vec<Incident>, origin: Coordinate) {
    let ranked = rank_by_distance(incidents.drain(..), origin);
    incidents.extend(ranked.into_iter().map(|nearby| nearby.incident));
}

/// Randomized quicksort over `items`, ascending by `key`.
///
/// `key` must not return `NaN`.
pub fn quicksort_by_key<T, R, F>(items: &mut [T], rng: &mut R, key: F)
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64 + Copy,
{
    shuffle(items, rng);
    quicksort(items, key);
}

fn clock_seeded_rng() -> StdRng {
    let now = Utc::now();
    let seed = now
        .timestamp_nanos_opt()
        .map_or_else(|| now.timestamp_millis() as u64, |nanos| nanos as u64);
    StdRng::seed_from_u64(seed)
}

/// Fisher-Yates: swap each position with a uniformly chosen position at or
/// after it.
fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let n = items.len();
    for i in 0..n {
        let r = rng.gen_range(i..n);
        items.swap(i, r);
    }
}

fn quicksort<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64 + Copy,
{
    if items.len() <= 1 {
        return;
    }

    let j = partition(items, key);
    let (left, right) = items.split_at_mut(j);
    quicksort(left, key);
    quicksort(&mut right[1..], key);
}

/// Hoare partition around `items[0]`. Returns the pivot's final position;
/// everything before it is not greater and everything after it is not less.
fn partition<T, F>(items: &mut [T], key: F) -> usize
where
    F: Fn(&T) -> f64,
{
    let hi = items.len() - 1;
    let pivot = key(&items[0]);
    let mut i = 0;
    let mut j = hi + 1;

    loop {
        loop {
            i += 1;
            if key(&items[i]) >= pivot || i == hi {
                break;
            }
        }
        loop {
            j -= 1;
            if pivot >= key(&items[j]) || j == 0 {
                break;
            }
        }
        if i >= j {
            break;
        }
        items.swap(i, j);
    }

    items.swap(0, j);
    j
}
