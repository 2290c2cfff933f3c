//! # Loss CLI
//!
//! Runs the time-step loss analysis of a project and prints the effective
//! prestress along every girder of a girder line at the end of design life.
//!
//! ```text
//! loss_cli [PROJECT.tsl] [--line N] [--json] [--save PATH]
//! ```
//!
//! Without a project file the sample bridge is analyzed. Set `RUST_LOG=info`
//! (or `debug`) to follow the analysis.

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;

use loss_core::bridge::{BridgeTopology, PrestressGeometry, StrandType};
use loss_core::file_io::{load_project, save_project};
use loss_core::intervals::IntervalSchedule;
use loss_core::losses::engine::line_girders;
use loss_core::poi::MemberEnd;
use loss_core::{AnalysisServices, LossError, LossResult, Project};

#[derive(Debug, Default)]
struct Options {
    project: Option<PathBuf>,
    save: Option<PathBuf>,
    line: usize,
    json: bool,
}

fn parse_args() -> LossResult<Options> {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--save" => {
                let path = args.next().ok_or_else(|| LossError::missing_field("--save PATH"))?;
                options.save = Some(PathBuf::from(path));
            }
            "--line" => {
                let value = args.next().ok_or_else(|| LossError::missing_field("--line N"))?;
                let line: usize = value
                    .parse()
                    .ok()
                    .filter(|line| 0 < *line)
                    .ok_or_else(|| {
                        LossError::invalid_input(
                            "--line",
                            value.clone(),
                            "Girder lines are numbered from 1",
                        )
                    })?;
                options.line = line - 1;
            }
            _ if arg.starts_with("--") => {
                return Err(LossError::invalid_input("argument", arg, "Unknown option"));
            }
            _ => options.project = Some(PathBuf::from(arg)),
        }
    }
    Ok(options)
}

/// Losses at one POI at the end of design life
#[derive(Debug, Serialize)]
struct PoiRow {
    girder: String,
    location: f64,
    straight_fpe: f64,
    harped_fpe: f64,
    straight_loss: f64,
    harped_loss: f64,
    tendon_fpe: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct TendonRow {
    girder: String,
    duct: usize,
    elongation: [f64; 2],
    anchor_set_zone: [f64; 2],
    average_friction_loss: f64,
    average_anchor_set_loss: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    project: String,
    line: usize,
    interval: usize,
    interval_description: String,
    points: Vec<PoiRow>,
    tendons: Vec<TendonRow>,
}

fn run(options: &Options) -> LossResult<Report> {
    let project = match &options.project {
        Some(path) => load_project(path)?,
        None => Project::new("", "SAMPLE", ""),
    };
    if let Some(path) = &options.save {
        save_project(&project, path)?;
        log::info!("Project saved to {}", path.display());
    }

    let (bridge, mut solver, mut engine) = project.analysis()?;
    let last = bridge.interval_count() - 1;
    let girders = line_girders(&bridge, options.line);
    let mut services = AnalysisServices::new(&bridge, &mut solver);

    let mut points = Vec::new();
    let mut tendons = Vec::new();
    for girder in girders {
        for duct in 0..bridge.duct_count(girder) {
            let anchor_set = engine.anchor_set(&mut services, girder, duct)?;
            tendons.push(TendonRow {
                girder: girder.to_string(),
                duct: duct + 1,
                elongation: [
                    engine.elongation(&mut services, girder, duct, MemberEnd::Start)?,
                    engine.elongation(&mut services, girder, duct, MemberEnd::End)?,
                ],
                anchor_set_zone: anchor_set.lset,
                average_friction_loss: engine
                    .average_friction_loss(&mut services, girder, duct)?,
                average_anchor_set_loss: engine
                    .average_anchor_set_loss(&mut services, girder, duct)?,
            });
        }

        for poi in bridge.points_of_interest(girder) {
            let losses = engine.losses(&mut services, &poi, last)?;
            let state = losses.state;
            points.push(PoiRow {
                girder: girder.to_string(),
                location: poi.dist_from_start,
                straight_fpe: state.strand_effective_stress(StrandType::Straight),
                harped_fpe: state.strand_effective_stress(StrandType::Harped),
                straight_loss: state.strand_loss(StrandType::Straight),
                harped_loss: state.strand_loss(StrandType::Harped),
                tendon_fpe: state.tendons.iter().map(|t| t.fpe).collect(),
            });
        }
    }

    Ok(Report {
        project: project.meta.job_id.clone(),
        line: options.line + 1,
        interval: last + 1,
        interval_description: bridge.description(last),
        points,
        tendons,
    })
}

fn print_report(report: &Report) {
    println!("Time-Step Prestress Losses - {}", report.project);
    println!("==============================================");
    println!(
        "Girder line {}, interval {}: {}",
        report.line, report.interval, report.interval_description
    );
    println!();

    if !report.tendons.is_empty() {
        println!(
            "{:<20} {:>5} {:>12} {:>12} {:>12} {:>12}",
            "Girder", "Duct", "Elong (mm)", "Lset (mm)", "Avg fric", "Avg set"
        );
        for t in &report.tendons {
            println!(
                "{:<20} {:>5} {:>12.1} {:>12.0} {:>12.1} {:>12.1}",
                t.girder,
                t.duct,
                t.elongation[0] + t.elongation[1],
                t.anchor_set_zone[0].max(t.anchor_set_zone[1]),
                t.average_friction_loss,
                t.average_anchor_set_loss
            );
        }
        println!();
    }

    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Girder", "x (mm)", "fpe str", "fpe harp", "loss str", "loss harp", "fpe PT"
    );
    for p in &report.points {
        let tendon = p.tendon_fpe.first().copied().unwrap_or(0.0);
        println!(
            "{:<20} {:>10.0} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
            p.girder,
            p.location,
            p.straight_fpe,
            p.harped_fpe,
            p.straight_loss,
            p.harped_loss,
            tendon
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let result = parse_args().and_then(|options| run(&options).map(|report| (options, report)));
    match result {
        Ok((options, report)) => {
            if options.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("error [SERIALIZATION_ERROR]: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error [{}]: {}", err.error_code(), err);
            ExitCode::FAILURE
        }
    }
}
