//! Base kit command-line host

use std::error::Error;
use std::path::{Path, PathBuf};

use bk_core::{EngineConfig, PartKind, Scene, SnapCycle, SnapEngine};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "bk")]
#[command(about = "Snap and inspect modular base parts")]
#[command(version)]
struct Cli {
    /// Engine configuration (RON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate the snap tables
    Check {
        /// Directory holding the snap tables
        #[arg(long, value_name = "DIR")]
        tables: PathBuf,
    },
    /// Snap one part onto another
    Snap {
        #[command(flatten)]
        input: SceneInput,
        #[arg(long)]
        source: Uuid,
        /// Part to snap onto (defaults to the one last snapped onto)
        #[arg(long)]
        target: Option<Uuid>,
        #[command(flatten)]
        cycle: CycleArgs,
        /// Save the moved part and snap memory back to the scene file
        #[arg(long)]
        write: bool,
    },
    /// List parts connected to a part
    Connected {
        #[command(flatten)]
        input: SceneInput,
        #[arg(long)]
        part: Uuid,
        /// Only snap points whose name contains this text
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// List control points that lead nowhere
    Floating {
        #[command(flatten)]
        input: SceneInput,
    },
}

#[derive(Args, Debug)]
struct SceneInput {
    /// Directory holding the snap tables
    #[arg(long, value_name = "DIR")]
    tables: PathBuf,
    /// Scene file (RON)
    #[arg(long, value_name = "FILE")]
    scene: PathBuf,
}

#[derive(Args, Debug, Default)]
#[group(multiple = false)]
struct CycleArgs {
    #[arg(long)]
    next_source: bool,
    #[arg(long)]
    prev_source: bool,
    #[arg(long)]
    next_target: bool,
    #[arg(long)]
    prev_target: bool,
}

impl CycleArgs {
    fn to_cycle(&self) -> SnapCycle {
        SnapCycle {
            next_source: self.next_source,
            prev_source: self.prev_source,
            next_target: self.next_target,
            prev_target: self.prev_target,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bk_cli=info,bk_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    for line in run(cli)? {
        println!("{line}");
    }
    Ok(())
}

/// Execute a command, returning the lines to print
fn run(cli: Cli) -> Result<Vec<String>, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Check { tables } => check(&tables, config),
        Command::Snap {
            input,
            source,
            target,
            cycle,
            write,
        } => {
            let (mut engine, mut scene) = open(&input, config)?;
            let cycle = cycle.to_cycle();
            let oriented = match target {
                Some(target) => engine.align(&mut scene, source, target, cycle)?,
                None => engine.resnap(&mut scene, source, cycle)?,
            };

            let state = engine.cache().get(source);
            let target_key = target
                .or(state.snapped_to)
                .and_then(|id| engine.cache().get(id).target_key);
            let mut lines = vec![if oriented {
                format!(
                    "snapped {} via {} onto {}",
                    source,
                    state.source_key.as_deref().unwrap_or("-"),
                    target_key.as_deref().unwrap_or("-")
                )
            } else {
                format!("placed {source} without snap points")
            }];
            if let Some(part) = scene.get_part(source) {
                let translation = part.world_transform.translation();
                lines.push(format!(
                    "position {:.4} {:.4} {:.4}",
                    translation.x, translation.y, translation.z
                ));
            }
            if write {
                engine.persist_snap_state(&mut scene);
                scene.save(&input.scene)?;
                info!("Scene written to {:?}", input.scene);
            }
            Ok(lines)
        }
        Command::Connected {
            input,
            part,
            filter,
        } => {
            let (engine, scene) = open(&input, config)?;
            if scene.get_part(part).is_none() {
                return Err(format!("part {part} not in scene").into());
            }
            Ok(engine
                .connected(&scene, part, &filter)
                .into_iter()
                .map(|id| describe(&scene, id))
                .collect())
        }
        Command::Floating { input } => {
            let (engine, scene) = open(&input, config)?;
            Ok(engine
                .floating_controls(&scene)
                .into_iter()
                .map(|id| describe(&scene, id))
                .collect())
        }
    }
}

fn check(tables: &Path, config: EngineConfig) -> Result<Vec<String>, Box<dyn Error>> {
    let engine = SnapEngine::load_tables(tables, config)?;
    let problems = engine.pairings().lint(engine.groups());

    let mut lines = vec![
        format!("{} snap groups", engine.groups().group_count()),
        format!("{} pairings", engine.pairings().len()),
    ];
    if problems.is_empty() {
        return Ok(lines);
    }
    lines.extend(problems.iter().map(|problem| format!("problem: {problem}")));
    lines.push(format!("{} table problem(s)", problems.len()));
    Err(lines.join("\n").into())
}

fn open(input: &SceneInput, config: EngineConfig) -> Result<(SnapEngine, Scene), Box<dyn Error>> {
    let mut engine = SnapEngine::load_tables(&input.tables, config)?;
    let scene = Scene::load(&input.scene)?;
    engine.restore_snap_state(&scene);
    info!("Loaded scene {:?} with {} parts", scene.name, scene.len());
    Ok((engine, scene))
}

fn describe(scene: &Scene, id: Uuid) -> String {
    match scene.get_part(id) {
        Some(part) if part.kind != PartKind::Static => {
            format!("{} {} ({})", id, part.type_id, part.kind.display_name())
        }
        Some(part) => format!("{} {}", id, part.type_id),
        None => id.to_string(),
    }
}
