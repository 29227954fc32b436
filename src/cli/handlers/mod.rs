use std::sync::Arc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, LoadedConfig};
use crate::io::service::ChecklistService;
use crate::logging;
use crate::model::checklist::{
    ChecklistFields, ChecklistKind, ClearanceFields, OnboardingFields,
};
use crate::model::task::TaskId;
use crate::ops::{reconcile, search};
use crate::sync::{ChecklistController, NavOutcome, load_blocking};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs besides its own args
struct Context {
    service: Arc<dyn ChecklistService>,
    kind: ChecklistKind,
    target: Option<String>,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let loaded = load_config_for(cli.dir.as_deref())?;
    logging::init_cli(loaded.config.log.level.as_deref());

    let Some(command) = cli.command else {
        return Err("no command given (try `mu --help`)".into());
    };

    let ctx = Context {
        service: config_io::open_service(&loaded)?,
        kind: cli.kind.unwrap_or(loaded.config.ui.default_kind),
        target: cli.target,
        json: cli.json,
    };

    match ctx.kind {
        ChecklistKind::Onboarding => run::<OnboardingFields>(command, &ctx),
        ChecklistKind::Clearance => run::<ClearanceFields>(command, &ctx),
    }
}

/// Resolve `-C` (or the working directory) and load the config there
pub fn load_config_for(dir: Option<&str>) -> Result<LoadedConfig, Box<dyn std::error::Error>> {
    let start = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };
    Ok(config_io::load_config(&start)?)
}

fn run<E: ChecklistFields>(command: Commands, ctx: &Context) -> CmdResult {
    match command {
        Commands::List => cmd_list::<E>(ctx),
        Commands::Show(args) => cmd_show::<E>(args, ctx),
        Commands::Options => cmd_options::<E>(ctx),
        Commands::Find(args) => cmd_find::<E>(args, ctx),
        Commands::Task(cmd) => cmd_task::<E>(cmd.action, ctx),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load<E: ChecklistFields>(ctx: &Context) -> ChecklistController<E> {
    let mut controller = ChecklistController::new(ctx.kind, ctx.target.clone());
    load_blocking(&mut controller, ctx.service.as_ref());
    controller
}

/// Surface loader problems without failing the command
fn warn_load_errors<E: ChecklistFields>(controller: &ChecklistController<E>) {
    if let Some(err) = controller.error() {
        eprintln!("warning: {}", err);
    }
}

/// Point the controller at a record given by 1-based number, name, or
/// department
fn select_record<E: ChecklistFields>(
    controller: &mut ChecklistController<E>,
    selector: &str,
) -> Result<(), String> {
    let len = controller.records().len();
    let index = match selector.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        Ok(n) => return Err(format!("record {} out of range (1-{})", n, len)),
        Err(_) => reconcile::find_target(controller.records(), selector),
    };
    let index = index.ok_or_else(|| format!("no record matches '{}'", selector))?;
    match controller.select(index) {
        NavOutcome::Moved(_) => Ok(()),
        other => Err(format!("could not open record {}: {:?}", index + 1, other)),
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_current<E: ChecklistFields>(
    controller: &ChecklistController<E>,
    json: bool,
) -> CmdResult {
    let record = controller
        .working_copy()
        .ok_or("no checklist records, and no departments to start one")?;
    let index = (!controller.is_placeholder()).then(|| controller.current_index());

    if json {
        let out = record_to_json(
            controller.kind(),
            index,
            controller.selected_department_id(),
            &record,
        );
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let position = index.map(|i| (i, controller.records().len()));
        print_lines(&format_record_detail(
            &record,
            position,
            controller.selected_department_id(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list<E: ChecklistFields>(ctx: &Context) -> CmdResult {
    let controller = load::<E>(ctx);
    if ctx.json {
        let out = RecordListJson {
            kind: ctx.kind,
            records: controller
                .records()
                .iter()
                .enumerate()
                .map(|(i, r)| summary_to_json(i, r))
                .collect(),
            error: controller.error(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        warn_load_errors(&controller);
        print_lines(&format_record_listing(ctx.kind, controller.records()));
    }
    Ok(())
}

fn cmd_show<E: ChecklistFields>(args: ShowArgs, ctx: &Context) -> CmdResult {
    let mut controller = load::<E>(ctx);
    if !ctx.json {
        warn_load_errors(&controller);
    }
    if let Some(selector) = args.record.as_deref() {
        select_record(&mut controller, selector)?;
    }
    print_current(&controller, ctx.json)
}

fn cmd_options<E: ChecklistFields>(ctx: &Context) -> CmdResult {
    let controller = load::<E>(ctx);
    if ctx.json {
        let out = OptionsJson {
            positions: controller.position_options(),
            departments: controller.department_options(),
            error: controller.error(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        warn_load_errors(&controller);
        print_lines(&format_options(controller.options()));
    }
    Ok(())
}

fn cmd_find<E: ChecklistFields>(args: FindArgs, ctx: &Context) -> CmdResult {
    let controller = load::<E>(ctx);
    let hits = search::filter_records(controller.records(), &args.query);
    if ctx.json {
        let out: Vec<FindHitJson> = hits
            .iter()
            .map(|h| FindHitJson {
                index: h.index,
                label: controller.records()[h.index].label().to_string(),
                matched: h.matched.clone(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_lines(&format_find_hits(controller.records(), &hits));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_task<E: ChecklistFields>(action: TaskAction, ctx: &Context) -> CmdResult {
    let mut controller = load::<E>(ctx);
    if controller.current().is_none() {
        let reason = controller
            .error()
            .unwrap_or_else(|| "no checklist records, and no departments to start one".into());
        return Err(reason.into());
    }
    // Never write into a fallback record the user did not ask for
    if let Some(target) = ctx.target.as_deref()
        && !controller.is_placeholder()
        && reconcile::find_target(controller.records(), target).is_none()
    {
        return Err(format!("no record matches '{}'", target).into());
    }

    let message = match action {
        TaskAction::Add(args) => {
            let id = controller.add_task()?;
            controller.update_task_text(&id, &args.text)?;
            if args.done {
                controller.toggle_task_status(&id, true)?;
            }
            format!("added task {}", id)
        }
        TaskAction::Done(args) => {
            let id = TaskId::parse(&args.id);
            controller.toggle_task_status(&id, true)?;
            format!("marked task {} done", id)
        }
        TaskAction::Pending(args) => {
            let id = TaskId::parse(&args.id);
            controller.toggle_task_status(&id, false)?;
            format!("marked task {} pending", id)
        }
        TaskAction::Edit(args) => {
            let id = TaskId::parse(&args.id);
            controller.update_task_text(&id, &args.text)?;
            format!("updated task {}", id)
        }
        TaskAction::Rm(args) => {
            let removed = controller.remove_task(&TaskId::parse(&args.id))?;
            format!("removed task {} ({})", removed.id, removed.task)
        }
    };

    if controller.is_dirty() {
        controller.save(ctx.service.as_ref())?;
    }

    if ctx.json {
        print_current(&controller, true)
    } else {
        let label = controller
            .current()
            .map(|r| r.label().to_string())
            .unwrap_or_default();
        println!("{} in {} ({}% done)", message, label, controller.completion_percentage());
        Ok(())
    }
}
