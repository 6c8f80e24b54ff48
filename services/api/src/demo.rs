use crate::infra::{parse_load_override, seed_load, seed_store};
use clap::Args;
use research_scholar::config::SupervisionConfig;
use research_scholar::error::AppError;
use research_scholar::registry::{
    FacultyId, MemoryOutbox, MemoryStore, RegistryError, RegistryService, ScholarEnrollment,
};
use research_scholar::supervision::{AssignmentDecision, AssignmentRequest, SupervisionOperation};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Faculty roster CSV (defaults to the built-in sample roster)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Proposed supervisor employee code
    #[arg(long)]
    pub(crate) supervisor: Option<String>,
    /// Proposed co-supervisor employee code
    #[arg(long)]
    pub(crate) co_supervisor: Option<String>,
    /// Current load to assume for a faculty member, as CODE=COUNT (repeatable)
    #[arg(long = "load", value_parser = parse_load_override)]
    pub(crate) loads: Vec<(FacultyId, u32)>,
    /// Remaining-slot band that triggers a near-capacity warning
    #[arg(long, default_value_t = 2)]
    pub(crate) warning_band: u32,
    /// Print the decision as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Faculty roster CSV (defaults to the built-in sample roster)
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let CheckArgs {
        roster,
        supervisor,
        co_supervisor,
        loads,
        warning_band,
        json,
    } = args;

    let store = seed_store(roster.as_deref())?;
    for (faculty_id, count) in &loads {
        seed_load(&store, faculty_id, *count)?;
    }
    let service = build_service(store, SupervisionConfig { warning_band });

    let decision = service.validate_assignment(&AssignmentRequest {
        supervisor_id: supervisor.map(FacultyId),
        co_supervisor_id: co_supervisor.map(FacultyId),
        operation: SupervisionOperation::Assign,
        scholar_id: None,
    });

    if json {
        let rendered = serde_json::to_string_pretty(&decision)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        println!("{rendered}");
    } else {
        render_decision(&decision);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = seed_store(args.roster.as_deref())?;
    let lead = FacultyId("CSE-101".to_string());
    seed_load(&store, &lead, 7)?;
    let service = build_service(store, SupervisionConfig::default());
    service.refresh_aggregates([&lead])?;

    println!("Supervision capacity demo");
    let lead_view = service.faculty(&lead)?;
    println!(
        "- {} ({}) supervises {} of {} scholars",
        lead_view.member.name,
        lead_view.member.designation,
        lead_view.member.summary.total,
        lead_view.max_scholars
    );

    println!("\nEnrolling an eighth scholar under {}", lead.0);
    enroll_and_report(&service, "demo-8", Some(&lead), None)?;

    println!("\nEnrolling a ninth scholar under {}", lead.0);
    enroll_and_report(&service, "demo-9", Some(&lead), None)?;

    let associate = FacultyId("CSE-102".to_string());
    println!("\nProposing {} as both supervisor and co-supervisor", associate.0);
    enroll_and_report(&service, "demo-same", Some(&associate), Some(&associate))?;

    let no_phd = FacultyId("CSE-104".to_string());
    println!("\nProposing {} (no PhD) as co-supervisor", no_phd.0);
    enroll_and_report(&service, "demo-phd", Some(&associate), Some(&no_phd))?;

    let lead_view = service.faculty(&lead)?;
    println!(
        "\n{} now holds {}/{} ({} remaining)",
        lead_view.member.name,
        lead_view.member.summary.total,
        lead_view.member.summary.max_scholars,
        lead_view.member.summary.remaining
    );
    Ok(())
}

fn build_service(
    store: MemoryStore,
    config: SupervisionConfig,
) -> RegistryService<MemoryStore, MemoryOutbox> {
    RegistryService::new(Arc::new(store), Arc::new(MemoryOutbox::default()), config)
}

fn enroll_and_report(
    service: &RegistryService<MemoryStore, MemoryOutbox>,
    suffix: &str,
    supervisor: Option<&FacultyId>,
    co_supervisor: Option<&FacultyId>,
) -> Result<(), AppError> {
    let enrollment = ScholarEnrollment {
        roll_number: format!("PHD-{suffix}"),
        registration_id: format!("REG-{suffix}"),
        email: format!("{suffix}@univ.edu"),
        name: format!("Scholar {suffix}"),
        department: "CSE".to_string(),
        research_area: None,
        enrolled_on: None,
        supervisor_id: supervisor.cloned(),
        co_supervisor_id: co_supervisor.cloned(),
    };

    match service.enroll_scholar(enrollment) {
        Ok(outcome) => {
            println!("  Enrolled {} -> {}", outcome.scholar.roll_number, outcome.scholar.id);
            for warning in &outcome.warnings {
                println!("  warning: {warning}");
            }
            Ok(())
        }
        Err(RegistryError::AssignmentRejected(decision)) => {
            render_decision(&decision);
            Ok(())
        }
        Err(other) => Err(other.into()),
    }
}

fn render_decision(decision: &AssignmentDecision) {
    let verdict = if decision.overall_valid {
        "accepted"
    } else {
        "rejected"
    };
    println!("  Assignment {verdict}");
    for (role, outcome) in [
        ("supervisor", &decision.supervisor),
        ("co-supervisor", &decision.co_supervisor),
    ] {
        if let Some(outcome) = outcome {
            println!(
                "  - {role} {}: {:?} | load {} -> {} of {}",
                outcome.faculty_id, outcome.status, outcome.current_load, outcome.effective_load,
                outcome.max_capacity
            );
        }
    }
    for error in &decision.errors {
        println!("  error: {error}");
    }
    for warning in &decision.warnings {
        println!("  warning: {warning}");
    }
}
