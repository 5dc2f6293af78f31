use crate::config::KnowledgeBase;
use crate::plotting;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use log::{info, warn};
use pwpro_core::{
    geocode::StaticGeocoder,
    logger::{self, CalculationLogger, LogEntry},
    measure_polygon, recommendation,
    repository::{JsonFileRepository, Repository},
    schedule::ScheduleBook,
    surface::{self, AverageColor},
};
use pwpro_schemas::{
    dilution::{DilutionRequest, DilutionResult, MixMode},
    estimate::{Contamination, Estimate, SurfaceType},
    geo::{GeoCoordinate, PolygonFile},
    schedule::ScheduleItem,
    weather::WeatherSnapshot,
};
use serde::Serialize;
use std::{fs, path::Path, time::Duration};
use uuid::Uuid;

/// Shared state for one CLI invocation.
pub struct Session {
    pub kb: KnowledgeBase,
    logger: Option<CalculationLogger>,
    json: bool,
}

impl Session {
    /// Loads the knowledge base and opens the history log. A log that cannot be
    /// opened only disables history.
    pub fn open(kb_path: &Path, log_path: &Path, json: bool) -> Result<Self> {
        let kb = KnowledgeBase::load(kb_path)?;
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
        }
        let logger = match CalculationLogger::new(log_path) {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!("History disabled, cannot open {}: {}", log_path.display(), e);
                None
            }
        };
        Ok(Self { kb, logger, json })
    }

    fn record<I: Serialize, O: Serialize>(&mut self, kind: &str, inputs: &I, outputs: &O) {
        if let Some(logger) = self.logger.as_mut() {
            if let Err(e) = logger.log(kind, inputs, outputs) {
                warn!("Failed to log {} calculation: {}", kind, e);
            }
        }
    }

    /// Prints `value` as JSON in JSON mode, otherwise runs the text report.
    fn emit<T: Serialize>(&self, value: &T, report: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            report();
        }
        Ok(())
    }
}

/// Parses `"lat,lon;lat,lon;..."`. Blank segments are skipped.
pub fn parse_points(text: &str) -> Result<Vec<GeoCoordinate>> {
    text.split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (lat, lon) = segment
                .split_once(',')
                .ok_or_else(|| anyhow!("Point '{}' is not in 'lat,lon' form", segment))?;
            let lat: f64 = lat
                .trim()
                .parse()
                .with_context(|| format!("Invalid latitude in '{}'", segment))?;
            let lon: f64 = lon
                .trim()
                .parse()
                .with_context(|| format!("Invalid longitude in '{}'", segment))?;
            Ok(GeoCoordinate::new(lat, lon))
        })
        .collect()
}

pub fn load_polygon_file(path: &Path) -> Result<PolygonFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse polygon file {:?}", path))
}

pub fn run_measure(
    session: &mut Session,
    points: Option<&str>,
    file: Option<&Path>,
    plot: Option<&Path>,
) -> Result<()> {
    let (label, points) = match (points, file) {
        (Some(text), _) => (None, parse_points(text)?),
        (None, Some(path)) => {
            let polygon = load_polygon_file(path)?;
            (polygon.label, polygon.points)
        }
        (None, None) => bail!("Provide --points or --file"),
    };

    let result = measure_polygon(&points);
    session.record("measure", &points, &result);

    if let Some(plot_path) = plot {
        if result.is_degenerate() {
            warn!("Skipping plot: fewer than 3 points");
        } else {
            plotting::plot_polygon_outline(plot_path, &points, label.as_deref(), &result)?;
            info!("Polygon outline written to {}", plot_path.display());
        }
    }

    session.emit(&result, || {
        println!("\n--- [Measure] {} ---", label.as_deref().unwrap_or("Polygon"));
        println!("  - Points:    {}", result.point_count());
        if result.is_degenerate() {
            println!("  - At least 3 points are needed to enclose an area.");
        }
        println!("  - Area:      {:.0} sq ft", result.area_square_feet);
        println!("  - Perimeter: {:.1} ft", result.perimeter_feet);
    })
}

pub fn run_batch_mix(session: &mut Session, tank: f64, percent: f64) -> Result<()> {
    let request = DilutionRequest::BatchMix {
        tank_volume: tank,
        desired_percent: percent,
    };
    let result = pwpro_core::dilution::compute_with_presets(&request, &session.kb.ratio_presets);
    session.record("mix_batch", &request, &result);
    session.emit(&result, || print_dilution_report(&result))
}

pub fn run_ratio_mix(
    session: &mut Session,
    mode: MixMode,
    volume: f64,
    ratio: f64,
    percent: Option<f64>,
) -> Result<()> {
    let request = DilutionRequest::ManifoldOrInjector {
        mode,
        total_volume: volume,
        ratio_denominator: ratio,
        desired_percent: percent,
    };
    if !(ratio.is_finite() && ratio > 0.0) {
        warn!("Ratio 1:{} is not usable; chemical volume will be zero", ratio);
    }
    let result = pwpro_core::dilution::compute_with_presets(&request, &session.kb.ratio_presets);
    session.record("mix_ratio", &request, &result);
    session.emit(&result, || print_dilution_report(&result))
}

fn print_dilution_report(result: &DilutionResult) {
    println!("\n--- [Mix] {} ---", result.mode);
    println!(
        "  - Chemical:  {:.3} gal ({:.1} oz)",
        result.chemical_volume, result.chemical_ounces
    );
    if let Some(water) = result.water_volume {
        println!("  - Water:     {:.3} gal", water);
    }
    println!("  - Achieved:  {:.2}%", result.achieved_percent);
    if let Some(suggested) = result.suggested_ratio {
        println!("  - Suggested: 1:{:.1}", suggested);
    }
    if let Some(preset) = result.nearest_preset {
        println!("  - Nearest preset: 1:{}", preset);
    }
}

pub fn run_advise(
    session: &mut Session,
    scope: &str,
    temperature_f: f64,
    wind_speed_mph: f64,
    rain_chance_percent: Option<f64>,
) -> Result<()> {
    let weather = WeatherSnapshot {
        temperature_f,
        wind_speed_mph,
        rain_chance_percent,
        description: None,
    };
    let advisory = session.kb.advisory_table().evaluate(scope, Some(&weather));
    session.record("advise", &(scope, &weather), &advisory);

    session.emit(&advisory, || {
        println!("\n--- [Advisory] {} work ---", advisory.category);
        println!("  - Status:  {}", advisory.status);
        println!(
            "  - Proceed: {}",
            if advisory.recommended { "yes" } else { "no" }
        );
        println!("  - {}", advisory.message);
        if let Some(rule) = &advisory.rule {
            println!("  - Rule:    {}", rule);
        }
    })
}

pub fn run_recommend(
    session: &mut Session,
    surface: SurfaceType,
    contamination: Contamination,
    sqft: f64,
) -> Result<()> {
    let result = recommendation::recommend(surface, contamination, sqft);
    session.record("recommend", &(surface, contamination, sqft), &result);
    session.emit(&result, || {
        println!("\n--- [Recommendation] {} / {} ---", surface, contamination);
        println!("{}", result.recommendation);
        for warning in &result.warnings {
            println!("  ! {}", warning);
        }
    })
}

/// Parses `"r,g,b"` with 0-255 channels.
pub fn parse_rgb(text: &str) -> Result<AverageColor> {
    let channels = text
        .split(',')
        .map(|c| {
            c.trim()
                .parse::<u8>()
                .with_context(|| format!("Invalid color channel '{}'", c.trim()))
        })
        .collect::<Result<Vec<u8>>>()?;
    match channels[..] {
        [r, g, b] => Ok(AverageColor::from_rgba8([r, g, b, 255])),
        _ => bail!("Expected 3 channels in '{}'", text),
    }
}

/// Parses `"WIDTHxHEIGHT"`.
pub fn parse_size(text: &str) -> Result<(u32, u32)> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("Size '{}' is not in WIDTHxHEIGHT form", text))?;
    Ok((
        w.trim().parse().context("Invalid width")?,
        h.trim().parse().context("Invalid height")?,
    ))
}

pub fn run_surface(session: &mut Session, rgb: &str, size: Option<&str>) -> Result<()> {
    let color = parse_rgb(rgb)?;
    let dimensions = size.map(parse_size).transpose()?;
    let findings = surface::analyze_color(color, dimensions);
    session.record("surface", &(rgb, size), &findings);

    session.emit(&findings, || {
        println!("\n--- [Surface Analysis] ---");
        let surfaces: Vec<&str> = findings.surfaces.iter().map(SurfaceType::as_str).collect();
        println!("  - Surface suggestions: {}", join_or_none(&surfaces));
        let objects: Vec<&str> = findings.objects.iter().map(String::as_str).collect();
        println!("  - Detected: {}", join_or_none(&objects));
        if let Some(sqft) = findings.sqft_estimate {
            println!("  - Image-based sqft suggestion: ~{} sqft", sqft as i64);
        }
    })
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub fn run_chemicals(session: &Session, search: Option<&str>) -> Result<()> {
    let found = session.kb.search_chemicals(search.unwrap_or(""));
    session.emit(&found, || {
        if found.is_empty() {
            println!("No chemicals match '{}'.", search.unwrap_or(""));
            return;
        }
        for chemical in &found {
            println!("\n{} [{}]", chemical.name, chemical.external_id);
            println!("  {}", chemical.short_description);
            println!("  Uses:        {}", chemical.uses);
            println!("  Precautions: {}", chemical.precautions);
            println!("  Mixing:      {}", chemical.mixing_note);
            if !chemical.brands.is_empty() {
                println!("  Brands:      {}", chemical.brands.join(", "));
            }
            if let Some(url) = &chemical.sds_url {
                println!("  SDS:         {}", url);
            }
        }
    })
}

/// User input for a new estimate.
#[derive(Debug, Clone)]
pub struct EstimateDraft {
    pub owner: Option<String>,
    pub address: Option<String>,
    pub scope: String,
    pub surface: SurfaceType,
    pub contamination: Contamination,
    pub sqft: f64,
    pub notes: String,
}

impl EstimateDraft {
    /// Builds the estimate to save: blank owners become "(Unknown)" and the
    /// recommendation is generated.
    pub fn into_estimate(self) -> Estimate {
        let owner = self
            .owner
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| "(Unknown)".to_string());
        let mut estimate = Estimate {
            property_owner_name: Some(owner),
            property_address: Some(self.address.unwrap_or_default()),
            scope_of_work: self.scope,
            surface: self.surface,
            contamination: self.contamination,
            sqft: self.sqft,
            notes: self.notes,
            ..Estimate::default()
        };
        recommendation::apply_to_estimate(&mut estimate);
        estimate
    }
}

pub fn run_estimate_add(session: &Session, store: &Path, draft: EstimateDraft) -> Result<()> {
    let mut repo = JsonFileRepository::<Estimate>::open(store)?;
    let estimate = draft.into_estimate();
    repo.insert(estimate.clone())?;
    info!("Saved estimate {} to {}", estimate.id, repo.path().display());

    session.emit(&estimate, || {
        println!("\n--- [Estimate {}] ---", estimate.id);
        println!("{}", estimate.recommendation);
        for warning in &estimate.warnings {
            println!("  ! {}", warning);
        }
    })
}

pub fn run_estimate_list(session: &Session, store: &Path) -> Result<()> {
    let estimates = JsonFileRepository::<Estimate>::open(store)?.list()?;
    session.emit(&estimates, || {
        if estimates.is_empty() {
            println!("No saved estimates.");
        }
        for estimate in &estimates {
            println!(
                "{} | {:<20} | {:<10} | {:>7.0} sqft | {}",
                estimate.id,
                estimate.property_owner_name.as_deref().unwrap_or("(Unknown)"),
                estimate.surface,
                estimate.sqft,
                if estimate.approved { "approved" } else { "pending" }
            );
        }
    })
}

/// Parses a `YYYY-MM-DD` job date as 09:00 UTC on that day.
pub fn parse_job_date(text: &str) -> Result<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", text))?;
    let start = date
        .and_hms_opt(9, 0, 0)
        .ok_or_else(|| anyhow!("Invalid time for {}", date))?;
    Ok(Utc.from_utc_datetime(&start))
}

pub fn run_job_add(
    session: &Session,
    store: &Path,
    owner: &str,
    address: &str,
    scope: &str,
    date: &str,
) -> Result<()> {
    let mut repo = JsonFileRepository::<ScheduleItem>::open(store)?;
    let job = ScheduleItem::new(owner, address, scope, parse_job_date(date)?);
    repo.insert(job.clone())?;
    info!("Scheduled job {} on {}", job.id, job.date.format("%Y-%m-%d"));
    session.emit(&job, || println!("Scheduled {} for {} ({})", job.scope, job.owner_name, job.id))
}

pub fn run_job_list(session: &Session, store: &Path) -> Result<()> {
    let book = ScheduleBook::new(JsonFileRepository::<ScheduleItem>::open(store)?.list()?);
    let upcoming = book.upcoming();
    session.emit(&upcoming, || {
        if upcoming.is_empty() {
            println!("No jobs scheduled.");
        }
        for job in &upcoming {
            let location = job
                .coordinate()
                .map_or_else(|| "not geocoded".to_string(), |c| c.to_string());
            println!(
                "{} | {} | {:<20} | {:<28} | {} | {}",
                job.date.format("%Y-%m-%d"),
                job.id,
                job.owner_name,
                job.address,
                job.scope,
                location
            );
        }
    })
}

pub fn run_job_remove(session: &Session, store: &Path, id: Uuid) -> Result<()> {
    let mut repo = JsonFileRepository::<ScheduleItem>::open(store)?;
    let removed = repo.delete(id)?;
    session.emit(&removed, || println!("Removed job {} ({})", removed.id, removed.owner_name))
}

/// Geocodes stored jobs and writes updated coordinates back.
pub fn run_job_geocode(
    session: &Session,
    store: &Path,
    address_book: &Path,
    force: bool,
    delay: Duration,
) -> Result<()> {
    let geocoder = StaticGeocoder::load(address_book)?;
    info!("Address book has {} entries", geocoder.len());

    let mut repo = JsonFileRepository::<ScheduleItem>::open(store)?;
    let mut book = ScheduleBook::new(repo.list()?);
    let report = book.batch_geocode(&geocoder, force, delay);

    repo.replace_all(book.items())?;

    session.emit(&report, || {
        println!("\n--- [Geocode Report] ---");
        for line in &report {
            println!("{}", line);
        }
    })
}

/// The newest `last` entries, or all of them.
fn most_recent(entries: &[LogEntry], last: Option<usize>) -> &[LogEntry] {
    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
    &entries[skip..]
}

pub fn run_history(session: &Session, log_path: &Path, last: Option<usize>) -> Result<()> {
    let entries = logger::read_entries(log_path)?;
    let shown = most_recent(&entries, last);
    session.emit(&shown, || {
        if shown.is_empty() {
            println!("No calculations logged yet.");
        }
        for entry in shown {
            println!("{} {:<10} {} -> {}", entry.timestamp, entry.kind, entry.inputs_json, entry.outputs_json);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Built-in knowledge base, history under `dir`, JSON output.
    fn quiet_session(dir: &Path) -> Session {
        Session::open(&dir.join("no_kb"), &dir.join("history.csv"), true).unwrap()
    }

    #[test]
    fn parses_point_lists() {
        let points = parse_points(" 40.0,-75.0; 40.001 , -75.0 ;40.001,-75.001;").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], GeoCoordinate::new(40.001, -75.0));
        assert!(parse_points("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_points() {
        assert!(parse_points("40.0").is_err());
        assert!(parse_points("40.0,abc").is_err());
        assert!(parse_points("north,-75").is_err());
    }

    #[test]
    fn parses_colors_and_sizes() {
        assert_eq!(parse_rgb("255, 0, 51").unwrap(), AverageColor::new(1.0, 0.0, 0.2));
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("1,2,300").is_err());
        assert_eq!(parse_size("4032x3024").unwrap(), (4032, 3024));
        assert!(parse_size("4032").is_err());
    }

    #[test]
    fn job_dates_start_at_nine_utc() {
        let date = parse_job_date("2025-06-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2025-06-01T09:00:00+00:00");
        assert!(parse_job_date("06/01/2025").is_err());
    }

    #[test]
    fn draft_fills_unknown_owner_and_recommendation() {
        let draft = EstimateDraft {
            owner: Some("  ".to_string()),
            address: None,
            scope: "Driveway".to_string(),
            surface: SurfaceType::Concrete,
            contamination: Contamination::Oil,
            sqft: 600.0,
            notes: String::new(),
        };
        let estimate = draft.into_estimate();
        assert_eq!(estimate.property_owner_name.as_deref(), Some("(Unknown)"));
        assert_eq!(estimate.property_address.as_deref(), Some(""));
        assert!(estimate.recommendation.starts_with("Recommended: "));
        assert_eq!(estimate.warnings.len(), 1);
    }

    #[test]
    fn polygon_files_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lot.yaml");
        fs::write(
            &path,
            "schema_version: \"1.0\"\nlabel: Back patio\npoints:\n  - { lat: 40.0, lon: -75.0 }\n  - { lat: 40.0001, lon: -75.0 }\n  - { lat: 40.0001, lon: -75.0001 }\n",
        )
        .unwrap();
        let polygon = load_polygon_file(&path).unwrap();
        assert_eq!(polygon.label.as_deref(), Some("Back patio"));
        assert_eq!(polygon.points.len(), 3);
    }

    #[test]
    fn geocode_updates_stored_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");
        let book = dir.path().join("book.yaml");
        fs::write(
            &book,
            "schema_version: \"1.0\"\naddresses:\n  \"12 Elm St\": { lat: 40.5, lon: -74.25 }\n",
        )
        .unwrap();

        let mut repo = JsonFileRepository::<ScheduleItem>::open(&store).unwrap();
        let date = parse_job_date("2025-06-01").unwrap();
        let known = ScheduleItem::new("Ann", "12 elm st", "House wash", date);
        let unknown = ScheduleItem::new("Bob", "99 Nowhere Rd", "Roof", date);
        repo.insert(known.clone()).unwrap();
        repo.insert(unknown.clone()).unwrap();

        let session = quiet_session(dir.path());
        run_job_geocode(&session, &store, &book, false, Duration::ZERO).unwrap();

        let repo = JsonFileRepository::<ScheduleItem>::open(&store).unwrap();
        let known = repo.get(known.id).unwrap().unwrap();
        assert_eq!(known.coordinate(), Some(GeoCoordinate::new(40.5, -74.25)));
        assert!(repo.get(unknown.id).unwrap().unwrap().needs_geocoding());
    }

    #[test]
    fn history_last_keeps_the_newest_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("history.csv");
        let mut session = Session::open(&dir.path().join("no_kb"), &log_path, true).unwrap();
        run_batch_mix(&mut session, 50.0, 1.0).unwrap();
        run_batch_mix(&mut session, 50.0, 2.0).unwrap();
        run_batch_mix(&mut session, 50.0, 3.0).unwrap();

        let entries = logger::read_entries(&log_path).unwrap();
        assert_eq!(entries.len(), 3);

        let shown = most_recent(&entries, Some(2));
        assert_eq!(shown.len(), 2);
        assert!(shown[0].inputs_json.contains("\"desired_percent\":2.0"));
        assert!(shown[1].inputs_json.contains("\"desired_percent\":3.0"));

        assert_eq!(most_recent(&entries, None).len(), 3);
        assert_eq!(most_recent(&entries, Some(10)).len(), 3);
        assert!(most_recent(&entries, Some(0)).is_empty());
        run_history(&session, &log_path, Some(2)).unwrap();
    }
}
