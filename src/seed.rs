/*!
 * # Demo data
 *
 * Generates a plausible, reproducible set of fact rows for a run of days so
 * the dashboards have something to show. All randomness flows through the
 * injected `Rng`, so a fixed seed always yields the same plan.
 *
 * Reference rows in a plan carry positional ids (1, 2, ...) and the fact
 * rows point at those; `SeedPlan::insert` rewrites the references to the
 * ids the database actually assigns.
 */

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    Iterable, PrimaryKeyToColumn, TransactionTrait,
};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

use crate::entities::{
    chemical_inventory, chemical_usage, daily_production_log, energy_usage, environmental_metric,
    equipment_status_log, explosives_inventory, explosives_usage, labor_metric, machinery,
    maintenance_record, mining_department, mining_site, safety_incident,
};

const SHIFTS: [&str; 3] = ["MORNING", "AFTERNOON", "NIGHT"];
const BLAST_LOCATIONS: [&str; 4] = ["Level 2 North", "Level 3 East", "Level 4 West", "Open Pit Bench 7"];
const INCIDENT_TYPES: [&str; 4] = ["Near miss", "Equipment failure", "Personal injury", "Environmental hazard"];
const SEVERITIES: [&str; 3] = ["Low", "Medium", "High"];
const MAINTENANCE_TYPES: [&str; 3] = ["Preventive", "Corrective", "Inspection"];
const MACHINE_STATUSES: [&str; 3] = ["Operational", "Under Maintenance", "Out of Service"];
const INSERT_CHUNK: usize = 500;

/// Everything one seeding run writes, grouped by table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedPlan {
    pub mining_sites: Vec<mining_site::Model>,
    pub departments: Vec<mining_department::Model>,
    pub chemical_inventory: Vec<chemical_inventory::Model>,
    pub explosives_inventory: Vec<explosives_inventory::Model>,
    pub machinery: Vec<machinery::Model>,
    pub energy_usage: Vec<energy_usage::Model>,
    pub production_logs: Vec<daily_production_log::Model>,
    pub chemical_usage: Vec<chemical_usage::Model>,
    pub explosives_usage: Vec<explosives_usage::Model>,
    pub labor_metrics: Vec<labor_metric::Model>,
    pub environmental_metrics: Vec<environmental_metric::Model>,
    pub maintenance_records: Vec<maintenance_record::Model>,
    pub status_logs: Vec<equipment_status_log::Model>,
    pub safety_incidents: Vec<safety_incident::Model>,
}

pub struct SeedGenerator<R: Rng> {
    rng: R,
}

impl SeedGenerator<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SeedGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// `scaled` units of `10^-scale`, drawn uniformly from `low..=high`.
    fn decimal(&mut self, low: i64, high: i64, scale: u32) -> Decimal {
        Decimal::new(self.rng.gen_range(low..=high), scale)
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// Plan covering the `days` days that end on `end` (inclusive).
    pub fn plan(&mut self, end: NaiveDate, days: u32) -> SeedPlan {
        let mut plan = SeedPlan {
            mining_sites: reference_sites(),
            departments: reference_departments(),
            ..Default::default()
        };
        plan.chemical_inventory = self.chemical_inventory();
        plan.explosives_inventory = self.explosives_inventory();

        let start = end.checked_sub_days(Days::new(u64::from(days.saturating_sub(1)))).unwrap_or(end);
        plan.machinery = self.machinery(start);

        let mut rehabilitated = self.decimal(50_000, 80_000, 1);
        for offset in 0..days {
            let Some(date) = start.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };

            let energy = self.energy(date);
            let production = self.production(date, energy.total_cost);
            plan.energy_usage.push(energy);
            plan.production_logs.push(production);

            rehabilitated += self.decimal(0, 500, 1);
            let environmental = self.environmental(date, rehabilitated);
            plan.environmental_metrics.push(environmental);

            self.chemical_usage(&mut plan, date);
            self.blasts(&mut plan, date);
            self.labor(&mut plan, date);
            self.equipment_events(&mut plan, date);
            self.incidents(&mut plan, date);
        }

        plan
    }

    fn chemical_inventory(&mut self) -> Vec<chemical_inventory::Model> {
        let items = [
            ("Sodium Cyanide", "kg", dec!(3.20), dec!(2000)),
            ("Lime", "kg", dec!(0.25), dec!(5000)),
            ("Caustic Soda", "kg", dec!(0.80), dec!(1000)),
            ("Activated Carbon", "kg", dec!(2.10), dec!(1500)),
            ("Hydrochloric Acid", "litres", dec!(0.60), dec!(800)),
        ];

        items
            .iter()
            .enumerate()
            .map(|(i, (name, unit, price, minimum))| {
                // somewhere between half and double the minimum
                let factor = self.decimal(50, 200, 2);
                chemical_inventory::Model {
                    id: position(i),
                    name: (*name).to_string(),
                    current_stock: (*minimum * factor).round_dp(2),
                    minimum_required: *minimum,
                    unit: (*unit).to_string(),
                    unit_price: *price,
                    supplier: Some("Zimchem Supplies".to_string()),
                }
            })
            .collect()
    }

    fn explosives_inventory(&mut self) -> Vec<explosives_inventory::Model> {
        let items = [
            ("ANFO", "Bulk", "kg", dec!(1.10), dec!(3000)),
            ("Emulsion", "Bulk", "kg", dec!(1.60), dec!(1500)),
            ("Detonators", "Initiating", "units", dec!(4.50), dec!(400)),
            ("Boosters", "Initiating", "units", dec!(6.00), dec!(200)),
        ];

        items
            .iter()
            .enumerate()
            .map(|(i, (name, kind, unit, price, minimum))| {
                let factor = self.decimal(50, 200, 2);
                explosives_inventory::Model {
                    id: position(i),
                    name: (*name).to_string(),
                    explosive_type: (*kind).to_string(),
                    current_stock: (*minimum * factor).round_dp(0),
                    minimum_required: *minimum,
                    unit: (*unit).to_string(),
                    unit_price: *price,
                    storage_location: "Magazine A".to_string(),
                }
            })
            .collect()
    }

    fn machinery(&mut self, start: NaiveDate) -> Vec<machinery::Model> {
        let fleet = [
            ("Excavator XL2000", "Excavator"),
            ("Dump Truck DT500", "Dump Truck"),
            ("Drill Rig DR100", "Drill Rig"),
            ("Jaw Crusher JC40", "Crusher"),
            ("Ball Mill BM12", "Mill"),
        ];

        fleet
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| {
                let serviced_days_ago = self.rng.gen_range(5..60);
                let last_maintenance = start
                    .checked_sub_days(Days::new(serviced_days_ago))
                    .unwrap_or(start);
                let next_maintenance_due = last_maintenance
                    .checked_add_days(Days::new(90))
                    .unwrap_or(last_maintenance);
                let status = if self.rng.gen_bool(0.8) {
                    MACHINE_STATUSES[0]
                } else {
                    self.pick(&MACHINE_STATUSES)
                };

                machinery::Model {
                    id: position(i),
                    name: (*name).to_string(),
                    machine_type: (*kind).to_string(),
                    status: status.to_string(),
                    efficiency: self.decimal(700, 980, 1),
                    operating_hours: self.decimal(10_000, 50_000, 1),
                    last_maintenance,
                    next_maintenance_due,
                }
            })
            .collect()
    }

    fn energy(&mut self, date: NaiveDate) -> energy_usage::Model {
        let electricity_kwh = self.decimal(800_000, 1_200_000, 2);
        let diesel_liters = self.decimal(150_000, 250_000, 2);
        let electricity_cost = (electricity_kwh * dec!(0.12)).round_dp(2);
        let diesel_cost = (diesel_liters * dec!(1.45)).round_dp(2);

        energy_usage::Model {
            id: 0,
            date,
            electricity_kwh,
            electricity_cost,
            diesel_liters,
            diesel_cost,
            total_cost: electricity_cost + diesel_cost,
            notes: None,
        }
    }

    fn production(&mut self, date: NaiveDate, running_cost: Decimal) -> daily_production_log::Model {
        let crushed = self.decimal(15_000, 26_000, 2);
        let hoisted = crushed + self.decimal(500, 3_000, 2);
        let milled = crushed - self.decimal(200, 1_500, 2);
        let recovery = self.decimal(850, 950, 1);
        let grade = self.decimal(250, 400, 2);
        let smelted_gold = (milled * grade * recovery / dec!(100)).round_dp(2);
        let gold_price = self.decimal(6_000, 7_000, 2);

        daily_production_log::Model {
            id: 0,
            date,
            total_tonnage_crushed: crushed,
            total_tonnage_hoisted: hoisted,
            total_tonnage_milled: milled,
            gold_recovery_rate: recovery,
            operational_efficiency: self.decimal(750, 980, 1),
            smelted_gold,
            gold_price,
            gross_profit: (smelted_gold * gold_price - running_cost).round_dp(2),
            notes: None,
        }
    }

    fn environmental(&mut self, date: NaiveDate, rehabilitated: Decimal) -> environmental_metric::Model {
        environmental_metric::Model {
            id: 0,
            date,
            dust_level_pm10: self.decimal(2_000, 8_000, 2),
            noise_level_db: self.decimal(600, 900, 1),
            water_usage_m3: self.decimal(2_000, 5_000, 1),
            waste_water_ph: self.decimal(650, 850, 2),
            rehabilitation_area_m2: rehabilitated,
        }
    }

    fn chemical_usage(&mut self, plan: &mut SeedPlan, date: NaiveDate) {
        let count = plan.chemical_inventory.len();
        for i in 0..count {
            if !self.rng.gen_bool(0.7) {
                continue;
            }
            let daily = plan.chemical_inventory[i].minimum_required / dec!(30);
            let factor = self.decimal(50, 150, 2);
            let process = self.pick(&["Leaching", "Elution", "pH control"]);
            plan.chemical_usage.push(chemical_usage::Model {
                id: 0,
                date,
                chemical_id: position(i),
                amount_used: (daily * factor).round_dp(2),
                process: process.to_string(),
            });
        }
    }

    fn blasts(&mut self, plan: &mut SeedPlan, date: NaiveDate) {
        if !self.rng.gen_bool(0.6) {
            return;
        }
        let location = self.pick(&BLAST_LOCATIONS);
        let purpose = self.pick(&["Production", "Development"]);
        let rating = if self.rng.gen_bool(0.85) {
            Some(self.decimal(60, 100, 1))
        } else {
            None
        };

        // bulk charge plus initiation
        let bulk = self.rng.gen_range(0..2);
        let charges = [
            (bulk, self.decimal(20_000, 60_000, 2)),
            (2, Decimal::from(self.rng.gen_range(20i64..80))),
        ];
        for (index, amount) in charges {
            plan.explosives_usage.push(explosives_usage::Model {
                id: 0,
                date,
                explosive_id: position(index),
                amount_used: amount,
                blast_location: location.to_string(),
                blast_purpose: purpose.to_string(),
                effectiveness_rating: rating,
            });
        }
    }

    fn labor(&mut self, plan: &mut SeedPlan, date: NaiveDate) {
        let crews: Vec<(i32, i32)> = plan
            .departments
            .iter()
            .map(|d| (d.id, crew_size(&d.department_type)))
            .collect();

        for shift in SHIFTS {
            for &(department_id, crew) in &crews {
                let absent = self.rng.gen_range(0..=crew / 5);
                let workers_present = crew - absent;
                let hours_worked = Decimal::from(workers_present * 8);
                let overtime_hours = Decimal::from(self.rng.gen_range(0..=workers_present / 2));
                let safety_incidents = i32::from(self.rng.gen_bool(0.03));

                plan.labor_metrics.push(labor_metric::Model {
                    id: 0,
                    date,
                    shift: shift.to_string(),
                    department_id: Some(department_id),
                    workers_present,
                    hours_worked,
                    overtime_hours,
                    productivity_index: self.decimal(700, 990, 1),
                    safety_incidents,
                    hourly_rate: dec!(4.50),
                });
            }
        }
    }

    fn equipment_events(&mut self, plan: &mut SeedPlan, date: NaiveDate) {
        let ids: Vec<i32> = plan.machinery.iter().map(|m| m.id).collect();
        for machinery_id in ids {
            if self.rng.gen_bool(0.08) {
                let maintenance_type = self.pick(&MAINTENANCE_TYPES);
                plan.maintenance_records.push(maintenance_record::Model {
                    id: 0,
                    machinery_id,
                    date,
                    maintenance_type: maintenance_type.to_string(),
                    description: format!("{} service", maintenance_type),
                    cost: self.decimal(20_000, 500_000, 2),
                    duration_hours: self.decimal(10, 120, 1),
                });
            }
            if self.rng.gen_bool(0.04) {
                let status = self.pick(&MACHINE_STATUSES);
                plan.status_logs.push(equipment_status_log::Model {
                    id: 0,
                    machinery_id,
                    date,
                    status: status.to_string(),
                    notes: None,
                });
            }
        }
    }

    fn incidents(&mut self, plan: &mut SeedPlan, date: NaiveDate) {
        if !self.rng.gen_bool(0.12) {
            return;
        }
        let department_id = plan
            .departments
            .choose(&mut self.rng)
            .map(|d| d.id)
            .filter(|_| self.rng.gen_bool(0.9));
        let severity = if self.rng.gen_bool(0.6) {
            SEVERITIES[0]
        } else {
            self.pick(&SEVERITIES)
        };
        let resolved = self.rng.gen_bool(0.7);
        let incident_type = self.pick(&INCIDENT_TYPES);

        plan.safety_incidents.push(safety_incident::Model {
            id: 0,
            date,
            incident_type: incident_type.to_string(),
            severity: severity.to_string(),
            description: format!("{} reported on shift", incident_type),
            action_taken: resolved.then(|| "Area made safe and crew briefed".to_string()),
            resolved,
            department_id,
        });
    }
}

fn position(index: usize) -> i32 {
    i32::try_from(index + 1).unwrap_or(i32::MAX)
}

fn crew_size(department_type: &str) -> i32 {
    match department_type {
        "extraction" => 40,
        "processing" => 25,
        "maintenance" => 12,
        _ => 6,
    }
}

fn reference_sites() -> Vec<mining_site::Model> {
    vec![
        mining_site::Model {
            id: 1,
            name: "Golden Valley Mine".to_string(),
            location: "Kadoma, Mashonaland West".to_string(),
            area_hectares: dec!(240.5),
            status: "active".to_string(),
            estimated_gold_reserves: dec!(48250.0),
        },
        mining_site::Model {
            id: 2,
            name: "Highland Gold Fields".to_string(),
            location: "Shurugwi, Midlands".to_string(),
            area_hectares: dec!(85.0),
            status: "exploration".to_string(),
            estimated_gold_reserves: dec!(12000.0),
        },
    ]
}

fn reference_departments() -> Vec<mining_department::Model> {
    [
        ("Mining", "extraction"),
        ("Processing", "processing"),
        ("Maintenance", "maintenance"),
        ("Safety and Health", "safety"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, kind))| mining_department::Model {
        id: position(i),
        name: (*name).to_string(),
        department_type: (*kind).to_string(),
    })
    .collect()
}

/// Active model for `model` with every column set except the primary key.
fn fresh<A>(model: <A::Entity as EntityTrait>::Model) -> A
where
    A: ActiveModelTrait,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    let mut active = model.into_active_model().reset_all();
    for key in <A::Entity as EntityTrait>::PrimaryKey::iter() {
        active.not_set(key.into_column());
    }
    active
}

/// Inserts reference rows one at a time; returns planned id -> stored id.
async fn insert_each<A, C>(
    db: &C,
    rows: &[<A::Entity as EntityTrait>::Model],
    id: fn(&<A::Entity as EntityTrait>::Model) -> i32,
) -> Result<BTreeMap<i32, i32>, DbErr>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A> + Clone,
{
    let mut ids = BTreeMap::new();
    for row in rows {
        let stored = fresh::<A>(row.clone()).insert(db).await?;
        ids.insert(id(row), id(&stored));
    }
    Ok(ids)
}

async fn insert_all<A, C>(db: &C, rows: Vec<<A::Entity as EntityTrait>::Model>) -> Result<usize, DbErr>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    let total = rows.len();
    let mut pending = rows.into_iter().map(fresh::<A>).peekable();
    while pending.peek().is_some() {
        let chunk: Vec<A> = pending.by_ref().take(INSERT_CHUNK).collect();
        <A::Entity as EntityTrait>::insert_many(chunk).exec(db).await?;
    }
    Ok(total)
}

fn remap(ids: &BTreeMap<i32, i32>, planned: i32) -> i32 {
    ids.get(&planned).copied().unwrap_or(planned)
}

impl SeedPlan {
    pub fn fact_rows(&self) -> usize {
        self.energy_usage.len()
            + self.production_logs.len()
            + self.chemical_usage.len()
            + self.explosives_usage.len()
            + self.labor_metrics.len()
            + self.environmental_metrics.len()
            + self.maintenance_records.len()
            + self.status_logs.len()
            + self.safety_incidents.len()
    }

    /// Writes the plan in one transaction. Returns the number of fact rows.
    pub async fn insert<C>(self, db: &C) -> Result<usize, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let start = Instant::now();
        let txn = db.begin().await?;

        insert_each::<mining_site::ActiveModel, _>(&txn, &self.mining_sites, |m| m.id).await?;
        let departments =
            insert_each::<mining_department::ActiveModel, _>(&txn, &self.departments, |m| m.id).await?;
        let chemicals =
            insert_each::<chemical_inventory::ActiveModel, _>(&txn, &self.chemical_inventory, |m| m.id)
                .await?;
        let explosives =
            insert_each::<explosives_inventory::ActiveModel, _>(&txn, &self.explosives_inventory, |m| m.id)
                .await?;
        let machines = insert_each::<machinery::ActiveModel, _>(&txn, &self.machinery, |m| m.id).await?;

        let mut written = 0;
        written += insert_all::<energy_usage::ActiveModel, _>(&txn, self.energy_usage).await?;
        written += insert_all::<daily_production_log::ActiveModel, _>(&txn, self.production_logs).await?;
        written += insert_all::<environmental_metric::ActiveModel, _>(&txn, self.environmental_metrics).await?;

        let chemical_usage = self
            .chemical_usage
            .into_iter()
            .map(|row| chemical_usage::Model {
                chemical_id: remap(&chemicals, row.chemical_id),
                ..row
            })
            .collect();
        written += insert_all::<chemical_usage::ActiveModel, _>(&txn, chemical_usage).await?;

        let explosives_usage = self
            .explosives_usage
            .into_iter()
            .map(|row| explosives_usage::Model {
                explosive_id: remap(&explosives, row.explosive_id),
                ..row
            })
            .collect();
        written += insert_all::<explosives_usage::ActiveModel, _>(&txn, explosives_usage).await?;

        let labor = self
            .labor_metrics
            .into_iter()
            .map(|row| labor_metric::Model {
                department_id: row.department_id.map(|id| remap(&departments, id)),
                ..row
            })
            .collect();
        written += insert_all::<labor_metric::ActiveModel, _>(&txn, labor).await?;

        let incidents = self
            .safety_incidents
            .into_iter()
            .map(|row| safety_incident::Model {
                department_id: row.department_id.map(|id| remap(&departments, id)),
                ..row
            })
            .collect();
        written += insert_all::<safety_incident::ActiveModel, _>(&txn, incidents).await?;

        let maintenance = self
            .maintenance_records
            .into_iter()
            .map(|row| maintenance_record::Model {
                machinery_id: remap(&machines, row.machinery_id),
                ..row
            })
            .collect();
        written += insert_all::<maintenance_record::ActiveModel, _>(&txn, maintenance).await?;

        let status_logs = self
            .status_logs
            .into_iter()
            .map(|row| equipment_status_log::Model {
                machinery_id: remap(&machines, row.machinery_id),
                ..row
            })
            .collect();
        written += insert_all::<equipment_status_log::ActiveModel, _>(&txn, status_logs).await?;

        txn.commit().await?;
        info!(rows = written, elapsed_ms = start.elapsed().as_millis() as u64, "Seed data written");
        Ok(written)
    }
}
