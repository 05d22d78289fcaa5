use std::io::{self, BufRead, Write};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use workload_planner::form::parse_date;
use workload_planner::{
    AppConfig, BoxedStore, CapacityTier, Planner, PlannerResult, Resource, ResourceForm, WorkItem,
    WorkItemDraft,
};

type CliPlanner = Planner<BoxedStore>;

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  resources                              List resources with their daily capacity\n  resource add <id> <tier> <name...>     Add a resource (tier: green|yellow|red)\n  resource tier <id> <tier>              Change a resource's capacity tier\n  resource delete <id>                   Delete an unassigned resource\n  pto add <id> <YYYY-MM-DD>              Book PTO for a resource\n  pto remove <id> <YYYY-MM-DD>           Cancel a PTO day\n  holidays                               List holidays\n  holiday add <YYYY-MM-DD>               Add a holiday\n  holiday remove <YYYY-MM-DD>            Remove a holiday\n  items                                  List work items\n  item add <resource> <hours> <start|-> <due|-> <name...>\n                                         Create a work item ('-' = today / no due date)\n  item hours <id> <hours>                Change the estimate\n  item assign <id> <resource>            Reassign a work item\n  item due <id> <YYYY-MM-DD|->           Set or clear the due date\n  item delete <id>                       Delete a work item\n  availability <start> <end> <hours>     Rank resources for a project window\n  refresh                                Recompute every work item\n  quit|exit                              Exit"
    );
}

fn render_resources(planner: &CliPlanner) -> PlannerResult<String> {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:<24} {:<8} {:>9}  {}\n",
        "id", "name", "tier", "hours/day", "pto"
    ));
    for resource in planner.resources()? {
        let pto = resource
            .pto
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!(
            "{:<12} {:<24} {:<8} {:>9}  {}\n",
            resource.id,
            resource.name,
            resource.tier,
            planner.daily_capacity(&resource)?,
            pto
        ));
    }
    Ok(out)
}

fn render_items(items: &[WorkItem]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4}  {:<24} {:>8}  {:<12} {:<10} {:<10} {:<10} {}\n",
        "id", "name", "hours", "resource", "start", "due", "end", "status"
    ));
    for item in items {
        out.push_str(&format!(
            "{:>4}  {:<24} {:>8}  {:<12} {:<10} {:<10} {:<10} {}\n",
            item.id,
            item.name,
            item.estimated_hours,
            item.resource_id,
            item.start_date,
            item.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            item.expected_end
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into()),
            item.status.map(|s| s.to_string()).unwrap_or_default()
        ));
    }
    out
}

fn describe_item(item: &WorkItem) -> String {
    let end = item
        .expected_end
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".into());
    let status = item.status.map(|s| s.to_string()).unwrap_or_default();
    format!(
        "Work item {} '{}' ends {} ({}).",
        item.id, item.name, end, status
    )
}

fn parse_hours(input: &str) -> Option<f64> {
    input.parse::<f64>().ok().filter(|h| h.is_finite() && *h >= 0.0)
}

fn resource_command(planner: &mut CliPlanner, args: &[&str]) {
    match args {
        ["add", id, tier, name @ ..] => {
            let form = ResourceForm::new(*id, name.join(" "), *tier);
            match form.parse().and_then(|r| planner.create_resource(r)) {
                Ok(resource) => println!("Added resource {}.", resource.id),
                Err(e) => println!("Error: {e}"),
            }
        }
        ["tier", id, tier] => {
            let result = CapacityTier::from_str(tier).and_then(|tier| {
                let mut resource: Resource = planner.resource(id)?;
                resource.tier = tier;
                planner.save_resource(resource)
            });
            match result {
                Ok(resource) => println!("Resource {} is now {}.", resource.id, resource.tier),
                Err(e) => println!("Error: {e}"),
            }
        }
        ["delete", id] => match planner.delete_resource(id) {
            Ok(()) => println!("Deleted resource {id}."),
            Err(e) => println!("Error: {e}"),
        },
        _ => println!("Usage: resource add <id> <tier> <name...> | resource tier <id> <tier> | resource delete <id>"),
    }
}

fn pto_command(planner: &mut CliPlanner, args: &[&str]) {
    let (action, id, date_s) = match args {
        [action @ ("add" | "remove"), id, date] => (*action, *id, *date),
        _ => {
            println!("Usage: pto add|remove <id> <YYYY-MM-DD>");
            return;
        }
    };
    let result = parse_date("date", date_s).and_then(|date| {
        if action == "add" {
            planner.add_pto(id, date)
        } else {
            planner.remove_pto(id, date)
        }
    });
    match result {
        Ok(true) => println!("PTO updated for {id}."),
        Ok(false) => println!("No PTO change for {id}."),
        Err(e) => println!("Error: {e}"),
    }
}

fn holiday_command(planner: &mut CliPlanner, args: &[&str]) {
    let (action, date_s) = match args {
        [action @ ("add" | "remove"), date] => (*action, *date),
        _ => {
            println!("Usage: holiday add|remove <YYYY-MM-DD>");
            return;
        }
    };
    let result = parse_date("date", date_s).and_then(|date| {
        if action == "add" {
            planner.add_holiday(date)
        } else {
            planner.remove_holiday(date)
        }
    });
    match result {
        Ok(true) => println!("Holidays updated."),
        Ok(false) => println!("No holiday change."),
        Err(e) => println!("Error: {e}"),
    }
}

fn item_command(planner: &mut CliPlanner, args: &[&str]) {
    match args {
        ["add", resource_id, hours_s, start_s, due_s, name @ ..] => {
            let Some(hours) = parse_hours(hours_s) else {
                println!("Invalid hours");
                return;
            };
            let start = match *start_s {
                "-" => Ok(planner.reference_date()),
                s => parse_date("start_date", s),
            };
            let due = match *due_s {
                "-" => Ok(None),
                s => parse_date("due_date", s).map(Some),
            };
            let result = start.and_then(|start| {
                let mut draft = WorkItemDraft::new(name.join(" "), hours, *resource_id, start);
                draft.due_date = due?;
                planner.create_work_item(draft)
            });
            match result {
                Ok(item) => println!("{}", describe_item(&item)),
                Err(e) => println!("Error: {e}"),
            }
        }
        ["hours", id_s, hours_s] => {
            let (Ok(id), Some(hours)) = (id_s.parse::<i32>(), parse_hours(hours_s)) else {
                println!("Usage: item hours <id> <hours>");
                return;
            };
            update_item(planner, id, |draft| {
                draft.estimated_hours = hours;
                Ok(())
            });
        }
        ["assign", id_s, resource_id] => {
            let Ok(id) = id_s.parse::<i32>() else {
                println!("Invalid id");
                return;
            };
            update_item(planner, id, |draft| {
                draft.resource_id = resource_id.to_string();
                Ok(())
            });
        }
        ["due", id_s, due_s] => {
            let Ok(id) = id_s.parse::<i32>() else {
                println!("Invalid id");
                return;
            };
            update_item(planner, id, |draft| {
                draft.due_date = match *due_s {
                    "-" => None,
                    s => Some(parse_date("due_date", s)?),
                };
                Ok(())
            });
        }
        ["delete", id_s] => match id_s.parse::<i32>() {
            Ok(id) => match planner.delete_work_item(id) {
                Ok(()) => println!("Deleted work item {id}."),
                Err(e) => println!("Error: {e}"),
            },
            Err(_) => println!("Invalid id"),
        },
        _ => println!(
            "Usage: item add <resource> <hours> <start|-> <due|-> <name...> | item hours|assign|due|delete ..."
        ),
    }
}

fn update_item<F>(planner: &mut CliPlanner, id: i32, edit: F)
where
    F: FnOnce(&mut WorkItemDraft) -> PlannerResult<()>,
{
    let result = planner.work_item(id).and_then(|item| {
        let mut draft = WorkItemDraft::from(&item);
        edit(&mut draft)?;
        planner.update_work_item(id, draft)
    });
    match result {
        Ok(item) => println!("{}", describe_item(&item)),
        Err(e) => println!("Error: {e}"),
    }
}

fn availability_command(planner: &CliPlanner, args: &[&str]) {
    let [start_s, end_s, hours_s] = args else {
        println!("Usage: availability <start> <end> <hours>");
        return;
    };
    let Some(hours) = parse_hours(hours_s) else {
        println!("Invalid hours");
        return;
    };
    let result = parse_date("start", start_s)
        .and_then(|start| Ok((start, parse_date("end", end_s)?)))
        .and_then(|(start, end)| planner.availability(start, end, hours));
    match result {
        Ok(rows) => {
            for row in rows {
                println!(
                    "{:<12} {:<24} {:>8} h  {}",
                    row.resource_id, row.resource_name, row.available_hours, row.status
                );
            }
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut planner = match AppConfig::load()
        .map_err(|e| e.to_string())
        .and_then(|config| {
            let store = config.open_store().map_err(|e| e.to_string())?;
            Planner::new(store, config.planner).map_err(|e| e.to_string())
        }) {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Failed to start: {e}");
            std::process::exit(1);
        }
    };

    println!("Workload Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            continue;
        };

        match *cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "resources" => match render_resources(&planner) {
                Ok(table) => print!("{table}"),
                Err(e) => println!("Error: {e}"),
            },
            "resource" => resource_command(&mut planner, args),
            "pto" => pto_command(&mut planner, args),
            "holidays" => {
                for date in planner.holidays() {
                    println!("{date}");
                }
            }
            "holiday" => holiday_command(&mut planner, args),
            "items" => match planner.work_items() {
                Ok(items) => print!("{}", render_items(&items)),
                Err(e) => println!("Error: {e}"),
            },
            "item" => item_command(&mut planner, args),
            "availability" => availability_command(&planner, args),
            "refresh" => match planner.refresh() {
                Ok(summary) => println!("Refreshed ({})", summary.to_cli_summary()),
                Err(e) => println!("Error: {e}"),
            },
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
