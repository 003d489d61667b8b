use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    date_utils::{days_between, days_until, iso_date},
    domain::{Animal, AnimalStatus, Priority, ProductionRecord, ReproductionRecord, ReproductionStatus},
};

/// Number of most recent records averaged by the drop detector.
pub const TREND_WINDOW: usize = 3;
const DAYS_PER_MONTH: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HerdCounts {
    pub total: usize,
    #[serde(rename = "lactantes")]
    pub lactating: usize,
    #[serde(rename = "secas")]
    pub dry: usize,
    #[serde(rename = "prenhes")]
    pub pregnant: usize,
}

pub fn herd_counts(animals: &[Animal]) -> HerdCounts {
    animals.iter().fold(
        HerdCounts {
            total: animals.len(),
            ..HerdCounts::default()
        },
        |mut acc, a| {
            match a.status {
                AnimalStatus::Lactating => acc.lactating += 1,
                AnimalStatus::Dry => acc.dry += 1,
                AnimalStatus::Pregnant => acc.pregnant += 1,
            }
            acc
        },
    )
}

/// Liters recorded on `day`, all animals together.
pub fn production_on(records: &[ProductionRecord], day: Date) -> f64 {
    records
        .iter()
        .filter(|r| r.date == day)
        .map(|r| r.quantity)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionTrend {
    pub animal_id: Uuid,
    #[serde(with = "iso_date")]
    pub latest_date: Date,
    pub recent_avg: f64,
    pub prior_avg: f64,
    pub variation_pct: f64,
}

/// Compare the mean of the three most recent records of an animal with the
/// mean of the window shifted back by one record.
///
/// The two windows overlap on indices 1 and 2. The prior window keeps only
/// the records that exist (indices 1..4) and is averaged over its own
/// length. Returns `None` with fewer than three records or a zero prior
/// average.
pub fn production_trend(records: &[ProductionRecord], animal_id: Uuid) -> Option<ProductionTrend> {
    let mut history: Vec<&ProductionRecord> =
        records.iter().filter(|r| r.animal_id == animal_id).collect();
    if history.len() < TREND_WINDOW {
        return None;
    }
    history.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

    let recent = &history[..TREND_WINDOW];
    let prior = &history[1..history.len().min(TREND_WINDOW + 1)];
    let recent_avg = mean(recent.iter().map(|r| r.quantity));
    let prior_avg = mean(prior.iter().map(|r| r.quantity));
    if prior_avg <= 0.0 {
        return None;
    }

    Some(ProductionTrend {
        animal_id,
        latest_date: history[0].date,
        recent_avg,
        prior_avg,
        variation_pct: (recent_avg - prior_avg) / prior_avg * 100.0,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReproductionIndicators {
    #[serde(rename = "taxaServico")]
    pub service_rate: f64,
    #[serde(rename = "taxaConcepcao")]
    pub conception_rate: f64,
    #[serde(rename = "taxaPrenhez")]
    pub pregnancy_rate: f64,
    #[serde(rename = "periodoServico")]
    pub service_period_days: f64,
    #[serde(rename = "intervaloPartos")]
    pub calving_interval_months: f64,
}

/// Herd reproduction indicators as of `today`.
///
/// * service rate: inseminations within the window / lactating animals
/// * conception rate: confirmed pregnancies among those / inseminations
/// * pregnancy rate: service rate x conception rate / 100
/// * service period: mean days from record creation to insemination over
///   pregnant records
/// * calving interval: mean months from insemination to predicted calving
pub fn reproduction_indicators(
    animals: &[Animal],
    records: &[ReproductionRecord],
    today: Date,
    window_days: i64,
) -> ReproductionIndicators {
    let eligible = animals
        .iter()
        .filter(|a| a.status == AnimalStatus::Lactating)
        .count();

    let in_window: Vec<&ReproductionRecord> = records
        .iter()
        .filter(|r| (0..=window_days).contains(&days_between(r.insemination_date, today)))
        .collect();
    let inseminated = in_window.len();
    let successful = in_window
        .iter()
        .filter(|r| r.status == ReproductionStatus::Pregnant)
        .count();

    let service_rate = percentage(inseminated, eligible);
    let conception_rate = percentage(successful, inseminated);

    let service_periods: Vec<i64> = records
        .iter()
        .filter(|r| r.status == ReproductionStatus::Pregnant)
        .map(|r| days_between(r.created_at.date(), r.insemination_date))
        .collect();
    let calving_intervals: Vec<i64> = records
        .iter()
        .filter_map(|r| {
            r.predicted_calving_date
                .map(|calving| days_between(r.insemination_date, calving))
        })
        .collect();

    ReproductionIndicators {
        service_rate,
        conception_rate,
        pregnancy_rate: service_rate * conception_rate / 100.0,
        service_period_days: guarded_mean(&service_periods),
        calving_interval_months: guarded_mean(&calving_intervals) / DAYS_PER_MONTH,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyProduction {
    #[serde(rename = "data", with = "iso_date")]
    pub date: Date,
    #[serde(rename = "manha")]
    pub morning: f64,
    #[serde(rename = "tarde")]
    pub afternoon: f64,
    #[serde(rename = "noite")]
    pub evening: f64,
    pub total: f64,
}

impl DailyProduction {
    fn empty(date: Date) -> Self {
        Self {
            date,
            morning: 0.0,
            afternoon: 0.0,
            evening: 0.0,
            total: 0.0,
        }
    }

    fn add(&mut self, r: &ProductionRecord) {
        self.morning += r.morning.unwrap_or(0.0);
        self.afternoon += r.afternoon.unwrap_or(0.0);
        self.evening += r.evening.unwrap_or(0.0);
        self.total += r.quantity;
    }
}

/// One entry per day in `from..=to`, days without records are zero.
pub fn daily_production(records: &[ProductionRecord], from: Date, to: Date) -> Vec<DailyProduction> {
    let mut days = BTreeMap::new();
    let mut day = Some(from);
    while let Some(d) = day.filter(|d| *d <= to) {
        days.insert(d, DailyProduction::empty(d));
        day = d.next_day();
    }
    for r in records {
        if let Some(entry) = days.get_mut(&r.date) {
            entry.add(r);
        }
    }
    days.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyProduction {
    #[serde(rename = "ano")]
    pub year: i32,
    #[serde(rename = "mes")]
    pub month: u8,
    #[serde(rename = "manha")]
    pub morning: f64,
    #[serde(rename = "tarde")]
    pub afternoon: f64,
    #[serde(rename = "noite")]
    pub evening: f64,
    pub total: f64,
}

/// Totals per calendar month, oldest first.
pub fn monthly_production(records: &[ProductionRecord]) -> Vec<MonthlyProduction> {
    let mut months: BTreeMap<(i32, u8), MonthlyProduction> = BTreeMap::new();
    for r in records {
        let key = (r.date.year(), u8::from(r.date.month()));
        let entry = months.entry(key).or_insert(MonthlyProduction {
            year: key.0,
            month: key.1,
            morning: 0.0,
            afternoon: 0.0,
            evening: 0.0,
            total: 0.0,
        });
        entry.morning += r.morning.unwrap_or(0.0);
        entry.afternoon += r.afternoon.unwrap_or(0.0);
        entry.evening += r.evening.unwrap_or(0.0);
        entry.total += r.quantity;
    }
    months.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreedProduction {
    #[serde(rename = "raca")]
    pub breed: String,
    pub total: f64,
    #[serde(rename = "animais")]
    pub animals: usize,
    #[serde(rename = "mediaPorAnimal")]
    pub average_per_animal: f64,
}

/// Liters produced on `day` grouped by breed. Only animals with at least one
/// record that day count towards the per-animal average.
pub fn production_by_breed(
    animals: &[Animal],
    records: &[ProductionRecord],
    day: Date,
) -> Vec<BreedProduction> {
    let breed_of: HashMap<Uuid, &str> = animals.iter().map(|a| (a.id, a.breed.as_str())).collect();

    let mut per_animal: HashMap<Uuid, f64> = HashMap::new();
    for r in records.iter().filter(|r| r.date == day) {
        *per_animal.entry(r.animal_id).or_default() += r.quantity;
    }

    let mut per_breed: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (animal_id, liters) in per_animal {
        if let Some(breed) = breed_of.get(&animal_id) {
            let entry = per_breed.entry(*breed).or_default();
            entry.0 += liters;
            entry.1 += 1;
        }
    }

    per_breed
        .into_iter()
        .map(|(breed, (total, count))| BreedProduction {
            breed: breed.to_string(),
            total,
            animals: count,
            average_per_animal: total / count.max(1) as f64,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProductionSummary {
    pub total: f64,
    #[serde(rename = "mediaDiaria")]
    pub daily_average: f64,
    #[serde(rename = "maior")]
    pub max: f64,
    #[serde(rename = "menor")]
    pub min: f64,
}

pub fn production_summary(days: &[DailyProduction]) -> ProductionSummary {
    if days.is_empty() {
        return ProductionSummary::default();
    }
    let total: f64 = days.iter().map(|d| d.total).sum();
    ProductionSummary {
        total,
        daily_average: total / days.len() as f64,
        max: days.iter().map(|d| d.total).fold(f64::MIN, f64::max),
        min: days.iter().map(|d| d.total).fold(f64::MAX, f64::min),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingBirth {
    pub animal_id: Uuid,
    pub animal: String,
    #[serde(rename = "dataPrevista", with = "iso_date")]
    pub date: Date,
    #[serde(rename = "diasRestantes")]
    pub days_remaining: i64,
    #[serde(rename = "urgencia")]
    pub urgency: Priority,
}

/// Animals with a next-calving date that has not passed yet, soonest first.
pub fn upcoming_births(animals: &[Animal], now: OffsetDateTime, limit: usize) -> Vec<UpcomingBirth> {
    let mut births: Vec<UpcomingBirth> = animals
        .iter()
        .filter_map(|a| {
            let date = a.next_calving_date?;
            let days_remaining = days_until(date, now);
            (days_remaining >= 0).then(|| UpcomingBirth {
                animal_id: a.id,
                animal: a.label(),
                date,
                days_remaining,
                urgency: if days_remaining <= 3 {
                    Priority::High
                } else if days_remaining <= 7 {
                    Priority::Medium
                } else {
                    Priority::Low
                },
            })
        })
        .collect();
    births.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.animal.cmp(&b.animal)));
    births.truncate(limit);
    births
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreedCount {
    #[serde(rename = "raca")]
    pub breed: String,
    #[serde(rename = "quantidade")]
    pub count: usize,
}

/// Animals per breed, largest group first.
pub fn breed_distribution(animals: &[Animal]) -> Vec<BreedCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for a in animals {
        *counts.entry(a.breed.as_str()).or_default() += 1;
    }
    let mut out: Vec<BreedCount> = counts
        .into_iter()
        .map(|(breed, count)| BreedCount {
            breed: breed.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.breed.cmp(&b.breed)));
    out
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

// empty input divides by 1, giving 0
fn guarded_mean(values: &[i64]) -> f64 {
    values.iter().sum::<i64>() as f64 / values.len().max(1) as f64
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::macros::{date, datetime};

    pub(crate) fn animal(tag: &str, status: AnimalStatus) -> Animal {
        Animal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            tag_number: tag.to_string(),
            name: format!("Vaca {tag}"),
            birth_date: date!(2020 - 05 - 10),
            breed: "Holandesa".to_string(),
            status,
            next_calving_date: None,
            notes: None,
            created_at: datetime!(2025-01-01 00:00 UTC),
        }
    }

    pub(crate) fn milking(animal_id: Uuid, date: Date, quantity: f64) -> ProductionRecord {
        ProductionRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            animal_id,
            date,
            quantity,
            morning: None,
            afternoon: None,
            evening: None,
            created_at: date.midnight().assume_utc(),
        }
    }

    fn insemination(
        animal_id: Uuid,
        date: Date,
        status: ReproductionStatus,
        calving: Option<Date>,
        created: OffsetDateTime,
    ) -> ReproductionRecord {
        ReproductionRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            animal_id,
            insemination_date: date,
            status,
            predicted_calving_date: calving,
            notes: None,
            created_at: created,
        }
    }

    #[test]
    fn herd_counts_partition_the_herd() {
        let herd = vec![
            animal("1", AnimalStatus::Lactating),
            animal("2", AnimalStatus::Lactating),
            animal("3", AnimalStatus::Pregnant),
            animal("4", AnimalStatus::Dry),
            animal("5", AnimalStatus::Pregnant),
        ];
        let counts = herd_counts(&herd);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.lactating, 2);
        assert_eq!(counts.pregnant, 2);
        assert_eq!(counts.dry, 1);
        assert_eq!(counts.lactating + counts.dry + counts.pregnant, counts.total);
        assert_eq!(herd_counts(&[]), HerdCounts::default());
    }

    #[test]
    fn production_on_sums_only_the_given_day() {
        let cow = Uuid::new_v4();
        let today = date!(2025 - 05 - 15);
        let records = vec![
            milking(cow, today, 12.5),
            milking(Uuid::new_v4(), today, 7.5),
            milking(cow, date!(2025 - 05 - 14), 30.0),
        ];
        assert_eq!(production_on(&records, today), 20.0);
        assert_eq!(production_on(&records, date!(2025 - 05 - 16)), 0.0);
    }

    #[test]
    fn trend_uses_overlapping_windows() {
        let cow = Uuid::new_v4();
        // newest first: 10, 10, 10, 20
        let records = vec![
            milking(cow, date!(2025 - 05 - 12), 20.0),
            milking(cow, date!(2025 - 05 - 15), 10.0),
            milking(cow, date!(2025 - 05 - 13), 10.0),
            milking(cow, date!(2025 - 05 - 14), 10.0),
        ];
        let trend = production_trend(&records, cow).expect("enough history");
        assert_eq!(trend.latest_date, date!(2025 - 05 - 15));
        assert!((trend.recent_avg - 10.0).abs() < 1e-9);
        assert!((trend.prior_avg - 40.0 / 3.0).abs() < 1e-9);
        assert!((trend.variation_pct + 25.0).abs() < 1e-9);
    }

    #[test]
    fn trend_needs_three_records() {
        let cow = Uuid::new_v4();
        let records = vec![
            milking(cow, date!(2025 - 05 - 14), 20.0),
            milking(cow, date!(2025 - 05 - 15), 1.0),
            milking(Uuid::new_v4(), date!(2025 - 05 - 15), 1.0),
        ];
        assert!(production_trend(&records, cow).is_none());
    }

    #[test]
    fn trend_with_exactly_three_records_averages_available_prior() {
        let cow = Uuid::new_v4();
        let records = vec![
            milking(cow, date!(2025 - 05 - 15), 9.0),
            milking(cow, date!(2025 - 05 - 14), 12.0),
            milking(cow, date!(2025 - 05 - 13), 18.0),
        ];
        let trend = production_trend(&records, cow).unwrap();
        assert!((trend.recent_avg - 13.0).abs() < 1e-9);
        assert!((trend.prior_avg - 15.0).abs() < 1e-9);
    }

    #[test]
    fn trend_skips_zero_prior_average() {
        let cow = Uuid::new_v4();
        let records = vec![
            milking(cow, date!(2025 - 05 - 15), 0.0),
            milking(cow, date!(2025 - 05 - 14), 0.0),
            milking(cow, date!(2025 - 05 - 13), 0.0),
        ];
        assert!(production_trend(&records, cow).is_none());
    }

    #[test]
    fn reproduction_rates_without_eligible_animals_are_zero() {
        let herd = vec![animal("1", AnimalStatus::Dry)];
        let ind = reproduction_indicators(&herd, &[], date!(2025 - 05 - 15), 21);
        assert_eq!(ind, ReproductionIndicators::default());
        assert!(ind.service_rate.is_finite());
    }

    #[test]
    fn reproduction_rates_follow_window() {
        let today = date!(2025 - 05 - 22);
        let herd: Vec<Animal> = (0..4)
            .map(|i| animal(&i.to_string(), AnimalStatus::Lactating))
            .collect();
        let created = datetime!(2025-05-01 08:00 UTC);
        let records = vec![
            insemination(herd[0].id, date!(2025 - 05 - 10), ReproductionStatus::Pregnant, None, created),
            insemination(herd[1].id, date!(2025 - 05 - 20), ReproductionStatus::Pending, None, created),
            // outside the 21 day window
            insemination(herd[2].id, date!(2025 - 04 - 01), ReproductionStatus::Pregnant, None, created),
        ];
        let ind = reproduction_indicators(&herd, &records, today, 21);
        assert!((ind.service_rate - 50.0).abs() < 1e-9);
        assert!((ind.conception_rate - 50.0).abs() < 1e-9);
        assert!((ind.pregnancy_rate - 25.0).abs() < 1e-9);
    }

    #[test]
    fn service_period_and_calving_interval_are_means() {
        let created = datetime!(2025-01-01 10:00 UTC);
        let cow = Uuid::new_v4();
        let records = vec![
            insemination(
                cow,
                date!(2025 - 03 - 02),
                ReproductionStatus::Pregnant,
                Some(date!(2025 - 12 - 07)),
                created,
            ),
            insemination(
                cow,
                date!(2025 - 02 - 10),
                ReproductionStatus::Pregnant,
                Some(date!(2025 - 11 - 17)),
                created,
            ),
            insemination(cow, date!(2025 - 05 - 01), ReproductionStatus::Open, None, created),
        ];
        let ind = reproduction_indicators(&[], &records, date!(2025 - 06 - 01), 21);
        // 60 and 40 days after creation
        assert!((ind.service_period_days - 50.0).abs() < 1e-9);
        // 280 days each
        assert!((ind.calving_interval_months - 280.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn daily_production_fills_gaps() {
        let cow = Uuid::new_v4();
        let mut rec = milking(cow, date!(2025 - 05 - 02), 30.0);
        rec.morning = Some(12.0);
        rec.afternoon = Some(10.0);
        rec.evening = Some(8.0);
        let records = vec![rec, milking(cow, date!(2025 - 05 - 09), 99.0)];
        let days = daily_production(&records, date!(2025 - 05 - 01), date!(2025 - 05 - 03));
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].total, 0.0);
        assert_eq!(days[1].total, 30.0);
        assert_eq!(days[1].morning, 12.0);
        assert_eq!(days[2].date, date!(2025 - 05 - 03));
        assert!(daily_production(&records, date!(2025 - 05 - 03), date!(2025 - 05 - 01)).is_empty());
    }

    #[test]
    fn monthly_production_groups_by_month() {
        let cow = Uuid::new_v4();
        let records = vec![
            milking(cow, date!(2025 - 02 - 03), 5.0),
            milking(cow, date!(2025 - 01 - 31), 4.0),
            milking(cow, date!(2025 - 02 - 28), 6.0),
        ];
        let months = monthly_production(&records);
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month, months[0].total), (2025, 1, 4.0));
        assert_eq!((months[1].month, months[1].total), (2, 11.0));
    }

    #[test]
    fn production_by_breed_averages_producing_animals() {
        let day = date!(2025 - 05 - 15);
        let mut jersey = animal("2", AnimalStatus::Lactating);
        jersey.breed = "Jersey".into();
        let holstein_a = animal("1", AnimalStatus::Lactating);
        let holstein_b = animal("3", AnimalStatus::Lactating);
        let herd = vec![holstein_a.clone(), jersey.clone(), holstein_b.clone()];
        let records = vec![
            milking(holstein_a.id, day, 20.0),
            milking(holstein_a.id, day, 4.0),
            milking(holstein_b.id, day, 16.0),
            milking(jersey.id, day, 15.0),
            milking(jersey.id, date!(2025 - 05 - 14), 100.0),
        ];
        let breeds = production_by_breed(&herd, &records, day);
        assert_eq!(breeds.len(), 2);
        assert_eq!(breeds[0].breed, "Holandesa");
        assert_eq!(breeds[0].total, 40.0);
        assert_eq!(breeds[0].animals, 2);
        assert_eq!(breeds[0].average_per_animal, 20.0);
        assert_eq!(breeds[1].breed, "Jersey");
        assert_eq!(breeds[1].total, 15.0);
    }

    #[test]
    fn production_summary_reports_extremes() {
        let cow = Uuid::new_v4();
        let records = vec![
            milking(cow, date!(2025 - 05 - 01), 400.0),
            milking(cow, date!(2025 - 05 - 02), 451.0),
            milking(cow, date!(2025 - 05 - 03), 430.0),
        ];
        let days = daily_production(&records, date!(2025 - 05 - 01), date!(2025 - 05 - 03));
        let summary = production_summary(&days);
        assert_eq!(summary.total, 1281.0);
        assert_eq!(summary.daily_average, 427.0);
        assert_eq!(summary.max, 451.0);
        assert_eq!(summary.min, 400.0);
        assert_eq!(production_summary(&[]), ProductionSummary::default());
    }

    #[test]
    fn upcoming_births_are_sorted_and_classified() {
        let now = datetime!(2025-05-15 12:00 UTC);
        let mut a = animal("1001", AnimalStatus::Pregnant);
        a.next_calving_date = Some(date!(2025 - 05 - 29));
        let mut b = animal("1042", AnimalStatus::Pregnant);
        b.next_calving_date = Some(date!(2025 - 05 - 17));
        let mut c = animal("1057", AnimalStatus::Pregnant);
        c.next_calving_date = Some(date!(2025 - 05 - 20));
        let mut past = animal("1063", AnimalStatus::Pregnant);
        past.next_calving_date = Some(date!(2025 - 05 - 01));
        let none = animal("1078", AnimalStatus::Dry);

        let births = upcoming_births(&[a, b, c, past, none], now, 10);
        let got: Vec<(i64, Priority)> = births.iter().map(|b| (b.days_remaining, b.urgency)).collect();
        assert_eq!(
            got,
            vec![(2, Priority::High), (5, Priority::Medium), (14, Priority::Low)]
        );
        assert!(upcoming_births(&[], now, 3).is_empty());
    }

    #[test]
    fn breed_distribution_orders_by_count() {
        let mut gir = animal("3", AnimalStatus::Dry);
        gir.breed = "Gir".into();
        let herd = vec![
            animal("1", AnimalStatus::Lactating),
            gir,
            animal("2", AnimalStatus::Lactating),
        ];
        let dist = breed_distribution(&herd);
        assert_eq!(
            dist,
            vec![
                BreedCount { breed: "Holandesa".into(), count: 2 },
                BreedCount { breed: "Gir".into(), count: 1 },
            ]
        );
    }
}
