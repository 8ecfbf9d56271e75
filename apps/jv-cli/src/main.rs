use clap::{Args, Parser, Subcommand, ValueEnum};
use jv_core::timing::{self, eos_timing};
use jv_models::{DualCavity, GradientShape, InteriorModel, ThreeLayer};
use jv_relax::{
    BodyPreset, EosConfig, HeavyEosConfig, RelaxConfig, RelaxResult, RelaxedModel, Relaxer,
    load_sweep_yaml, load_yaml, run_sweep,
};
use jv_tof::GridSpacing;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "jovian")]
#[command(
    about = "Giant-planet interior models relaxed with 4th-order theory of figures",
    long_about = None
)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Report EOS call timing
    #[arg(long, global = true)]
    timing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Core, inner envelope and outer envelope with fixed z1 and y1
    ThreeLayer {
        #[arg(value_enum)]
        planet: Planet,
        /// Outer envelope Y/(X+Y)
        y1: f64,
        /// Outer envelope metallicity
        z1: f64,
        /// Inner envelope metallicity
        z2: f64,
        /// Initial core radius (normalised)
        #[arg(long, default_value_t = 0.1)]
        rc: f64,
        /// Inner/outer envelope transition radius (normalised)
        #[arg(long, default_value_t = 0.8)]
        rt: f64,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Stable cavity and middle zone below the envelope
    DualCavity {
        #[arg(value_enum)]
        planet: Planet,
        /// Outer envelope metallicity
        z1: f64,
        /// Deep Y/(X+Y)
        y2: f64,
        /// Inner transition outer radius
        #[arg(long, default_value_t = 0.2)]
        rio: f64,
        /// Outer transition outer radius
        #[arg(long, default_value_t = 0.8)]
        roo: f64,
        /// Transition band width
        #[arg(long, default_value_t = 0.01)]
        width: f64,
        /// Initial outer envelope Y/(X+Y)
        #[arg(long, default_value_t = 0.27)]
        y1: f64,
        #[arg(long, value_enum, default_value_t = Gradient::Sigmoid)]
        gradient: Gradient,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Relax one model described by a YAML file
    Run { config: PathBuf },
    /// Relax every point of a YAML sweep definition in parallel
    Sweep {
        definition: PathBuf,
        /// Worker threads (all cores when absent)
        #[arg(long)]
        threads: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Planet {
    Jupiter,
    Saturn,
}

#[derive(Clone, Copy, ValueEnum)]
enum Gradient {
    Linear,
    Sigmoid,
}

#[derive(Clone, Copy, ValueEnum)]
enum ZEos {
    Ice,
    Serpentine,
    Blend,
}

#[derive(Args)]
struct CommonArgs {
    /// Keep the spin frequency fixed as the mean radius changes
    #[arg(long)]
    adjust_mrot: bool,
    #[arg(long, default_value_t = 4096)]
    nzones: usize,
    /// Gauss-Lobatto level distribution
    #[arg(long)]
    use_gauss_lobatto: bool,
    #[arg(long, default_value_t = 0.275)]
    y_mean: f64,
    #[arg(long = "J-tol", default_value_t = 1e-4)]
    j_tol: f64,
    #[arg(long, default_value_t = 1e-4)]
    y_tol: f64,
    #[arg(long = "M-tol", default_value_t = 1e-4)]
    m_tol: f64,
    #[arg(long, default_value_t = 199)]
    max_iters: usize,
    /// Density perturbation amplitude
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    drho_a: f64,
    /// Density perturbation centroid (log10 P)
    #[arg(long, default_value_t = 10.0)]
    drho_c: f64,
    /// Density perturbation width (log10 P)
    #[arg(long, default_value_t = 1.0)]
    drho_w: f64,
    /// Theory-of-figures order
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(4..=4))]
    toforder: u32,
    #[arg(long, value_enum, default_value_t = ZEos::Ice)]
    z_eos: ZEos,
    /// Ice fraction of the heavy elements with --z-eos blend
    #[arg(long, default_value_t = 0.5)]
    f_ice: f64,
    /// Use the high-pressure heavy-element tables
    #[arg(long)]
    extended_tables: bool,
    /// EOS data directory (defaults to $JOVIAN_EOS_DIR)
    #[arg(long)]
    eos_dir: Option<PathBuf>,
    /// Analytic n = 1 polytropes instead of tables
    #[arg(long)]
    analytic_eos: bool,
    /// Include the radial profile in --json output
    #[arg(long)]
    profile: bool,
}

impl CommonArgs {
    fn config(&self, planet: Planet, model: InteriorModel) -> RelaxConfig {
        let mut cfg = RelaxConfig::new(model);
        cfg.target.body = match planet {
            Planet::Jupiter => BodyPreset::Jupiter,
            Planet::Saturn => BodyPreset::Saturn,
        };
        cfg.adjust_small = self.adjust_mrot;
        cfg.tof.nz = self.nzones;
        cfg.tof.order = self.toforder;
        if self.use_gauss_lobatto {
            cfg.tof.spacing = GridSpacing::GaussLobatto;
        }
        cfg.ymean = self.y_mean;
        cfg.tolerances.j2n_rtol = self.j_tol;
        cfg.tolerances.ymean_rtol = self.y_tol;
        cfg.tolerances.mtot_rtol = self.m_tol;
        cfg.max_iters_outer = self.max_iters;
        cfg.perturbation.amplitude = self.drho_a;
        cfg.perturbation.centroid = self.drho_c;
        cfg.perturbation.width = self.drho_w;
        cfg.keep_profile = self.profile;
        cfg.eos = if self.analytic_eos {
            EosConfig::analytic()
        } else {
            EosConfig::Tabulated {
                data_dir: self.eos_dir.clone(),
                heavy: match self.z_eos {
                    ZEos::Ice => HeavyEosConfig::Ice,
                    ZEos::Serpentine => HeavyEosConfig::Serpentine,
                    ZEos::Blend => HeavyEosConfig::Blend { f_ice: self.f_ice },
                },
                extended: self.extended_tables,
            }
        };
        cfg
    }
}

fn main() -> RelaxResult<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
    if cli.timing {
        timing::enable_timing();
    }

    match cli.command {
        Commands::ThreeLayer {
            planet,
            y1,
            z1,
            z2,
            rc,
            rt,
            common,
        } => {
            let mut model = ThreeLayer::new(y1, z1, z2);
            model.r_core = rc;
            model.r_trans = rt;
            let cfg = common.config(planet, InteriorModel::ThreeLayer(model));
            cmd_relax(cfg, cli.json)?;
        }
        Commands::DualCavity {
            planet,
            z1,
            y2,
            rio,
            roo,
            width,
            y1,
            gradient,
            common,
        } => {
            let mut model = DualCavity::with_thin_bands(y1, z1, y2, rio, roo, width);
            model.gradient_shape = match gradient {
                Gradient::Linear => GradientShape::Linear,
                Gradient::Sigmoid => GradientShape::Sigmoid,
            };
            let cfg = common.config(planet, InteriorModel::DualCavity(model));
            cmd_relax(cfg, cli.json)?;
        }
        Commands::Run { config } => cmd_relax(load_yaml(&config)?, cli.json)?,
        Commands::Sweep {
            definition,
            threads,
        } => cmd_sweep(&definition, threads, cli.json)?,
    }

    if cli.timing
        && let Some(summary) = eos_timing::summary()
    {
        println!("\nEOS timing:\n{summary}");
    }
    Ok(())
}

fn cmd_relax(cfg: RelaxConfig, json: bool) -> RelaxResult<()> {
    let start = Instant::now();
    let mut relaxer = Relaxer::new(cfg)?;
    let body = relaxer.target().body.clone();
    let result = relaxer.relax()?;
    info!(elapsed_s = start.elapsed().as_secs_f64(), "relaxed");

    if json {
        println!("{}", to_json(&result)?);
        return Ok(());
    }
    print_model(&result, &body);
    Ok(())
}

fn print_model(result: &RelaxedModel, body: &jv_relax::Body) {
    let rescaled = result
        .moments
        .rescaled(result.r_eq, jv_core::to_cm(body.j_ref_radius));
    println!(
        "✓ {} model converged in {} outer iterations",
        result.model, result.residuals.iterations
    );
    println!("  J2 x 1e6 = {:>12.4}", rescaled.j2 * 1e6);
    println!("  J4 x 1e6 = {:>12.4}", rescaled.j4 * 1e6);
    println!("  J6 x 1e6 = {:>12.4}", rescaled.j6 * 1e6);
    println!(
        "  (normalised to {:.0} km)",
        jv_core::to_cm(body.j_ref_radius) / 1e5
    );
    println!(
        "  M        = {:.6e} g (target {:.6e})",
        result.mass, result.target_mass
    );
    println!("  Y/(X+Y)  = {:.5}", result.ymean);
    println!("  R_mean   = {:.1} km", result.r_mean / 1e5);
    println!("  m        = {:.6}", result.small);
    for knob in [&result.y_knob, &result.mass_knob] {
        println!("  {:<8} = {:.5}", knob.name, knob.value);
    }
    println!(
        "  Mahalanobis distance from {}: {:.3}",
        body.name,
        body.mahalanobis(&result.moments, result.r_eq)
    );
}

fn cmd_sweep(definition: &Path, threads: Option<usize>, json: bool) -> RelaxResult<()> {
    let def = load_sweep_yaml(definition)?;
    let points = def.expand()?;
    info!(runs = points.len(), "sweep expanded");
    let eos = def.base.eos.build()?;

    let summary = match threads {
        Some(n) => {
            let pool = rayon_pool(n)?;
            pool.install(|| run_sweep(points, eos))
        }
        None => run_sweep(points, eos),
    };

    if json {
        println!("{}", to_json(&summary)?);
        return Ok(());
    }
    let body = def.base.target.resolve().body;
    println!(
        "Sweep: {} converged, {} failed",
        summary.num_successful(),
        summary.num_failed()
    );
    for (record, model) in summary.converged() {
        println!(
            "  #{:<4} {:?}  J2 = {:.6e}  J4 = {:.6e}  J6 = {:.6e}  D = {:.3}",
            record.index,
            record.parameters,
            model.j2(),
            model.j4(),
            model.j6(),
            body.mahalanobis(&model.moments, model.r_eq)
        );
    }
    for (kind, indices) in &summary.failures {
        println!("  {kind}: runs {indices:?}");
    }
    Ok(())
}

fn rayon_pool(threads: usize) -> RelaxResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| jv_relax::RelaxError::InvalidConfig {
            what: format!("thread pool: {e}"),
        })
}

fn to_json<T: serde::Serialize>(value: &T) -> RelaxResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
