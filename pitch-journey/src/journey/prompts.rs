//! Prompt table: one exhaustive match from step to chat content.
//!
//! Forward transitions and prompt restoration both render through
//! [`render_prompt`], so reopening the chat reproduces exactly what the
//! transition showed. Output depends only on the step, the explored sets and
//! the static data.

use crate::config::JourneyConfig;
use crate::content::{PromptCommand, PromptContent};
use crate::dataset::Dataset;
use crate::journey::{Journey, JourneySession, Step};

const FOLLOW_UP_FALLBACK: &str =
    "There is no prepared answer for that yet; the investment team will follow up with you.";

#[must_use]
pub fn render_prompt(
    step: Step,
    session: &JourneySession,
    data: &Dataset,
    config: &JourneyConfig,
) -> PromptContent {
    match step {
        Step::A1 => PromptContent::new(format!("Welcome to {}", data.site.name))
            .line(data.site.tagline.clone())
            .line(
                "This short tour covers the resources, the infrastructure and the \
                 investment opportunities on site.",
            )
            .action("Start exploring", PromptCommand::Advance(Step::A2)),
        Step::A2 => explore_prompt(session, data, config),
        Step::A3 => {
            let mut prompt = PromptContent::new("Resources secured")
                .line("Every key resource is in place for data-intensive occupiers:");
            for id in &config.required_explore {
                if let Ok(resource) = data.resource(id) {
                    let headline = resource
                        .stats
                        .first()
                        .map(|stat| format!(" ({}: {})", stat.label, stat.value))
                        .unwrap_or_default();
                    prompt = prompt.line(format!("{}{headline}", resource.name));
                }
            }
            prompt.action(
                "See the infrastructure",
                PromptCommand::Transition(Journey::B),
            )
        }
        Step::B1 => PromptContent::new(Journey::B.title())
            .line(format!(
                "Mapping the companies already operating within {} km of the site...",
                data.site.boundary_radius_km
            )),
        Step::B4 => {
            let reviewed = session.explored_companies();
            let mut prompt = PromptContent::new("Who is already here").line(format!(
                "{} companies operate inside the boundary.",
                data.companies.len()
            ));
            for company in &data.companies {
                prompt = prompt.line(format!("{} ({})", company.name, company.sector));
            }
            prompt = prompt.line(format!(
                "{} of {} companies reviewed.",
                data.companies
                    .iter()
                    .filter(|company| reviewed.contains(&company.id))
                    .count(),
                data.companies.len()
            ));
            for company in &data.companies {
                prompt = prompt.action(
                    format!("Review {}", company.name),
                    PromptCommand::ReviewCompany(company.id.clone()),
                );
            }
            prompt.action("Next: transport links", PromptCommand::Advance(Step::B6))
        }
        Step::B6 => {
            let mut prompt = PromptContent::new("Transport links");
            for road in &data.roads {
                prompt = prompt.line(format!("{}: {}", road.name, road.summary));
            }
            prompt.action("What comes next", PromptCommand::Advance(Step::B7))
        }
        Step::B7 => {
            let mut prompt = PromptContent::new("What's coming next");
            for zone in &data.future_zones {
                prompt = prompt.line(format!("{}: {}", zone.name, zone.summary));
            }
            for park in &data.science_parks {
                prompt = prompt.line(format!("{}: {}", park.name, park.summary));
            }
            prompt.action(
                "View investment opportunities",
                PromptCommand::Transition(Journey::C),
            )
        }
        Step::C1 => {
            let mut prompt = PromptContent::new(Journey::C.title());
            for property in &data.properties {
                prompt = prompt.line(format!(
                    "{}: {} - {}",
                    property.name, property.asking_price, property.summary
                ));
            }
            prompt.action("Finish the tour", PromptCommand::Advance(Step::Complete))
        }
        Step::Complete => PromptContent::new("Thank you")
            .line(format!(
                "That concludes the tour of {}. Ask anything about the site below, \
                 or start again.",
                data.site.name
            ))
            .action("Start again", PromptCommand::Restart)
            .with_input(),
    }
}

fn explore_prompt(session: &JourneySession, data: &Dataset, config: &JourneyConfig) -> PromptContent {
    let explored = session.explored_resources();
    let mut prompt = PromptContent::new(Journey::A.title())
        .line("Select each highlighted resource to see what the site can supply.");
    for id in &config.required_explore {
        let name = data.resource(id).map_or(id.as_str(), |r| r.name.as_str());
        let status = if explored.contains(id) {
            "explored"
        } else {
            "not yet explored"
        };
        prompt = prompt.line(format!("{name}: {status}"));
    }
    for id in &config.required_explore {
        let name = data.resource(id).map_or(id.as_str(), |r| r.name.as_str());
        let label = if explored.contains(id) {
            format!("Revisit {name}")
        } else {
            format!("Explore {name}")
        };
        prompt = prompt.action(label, PromptCommand::Explore(id.clone()));
    }
    if session.explore_complete(&config.required_explore) {
        prompt
            .line("All key resources explored.")
            .action("Continue", PromptCommand::Advance(Step::A3))
    } else {
        let done = config
            .required_explore
            .iter()
            .filter(|id| explored.contains(*id))
            .count();
        prompt.line(format!(
            "{done} of {} explored.",
            config.required_explore.len()
        ))
    }
}

/// Answer to a free-form question asked after the tour.
#[must_use]
pub fn render_follow_up(question: &str, data: &Dataset) -> PromptContent {
    let answer = data
        .follow_up_for(question)
        .map_or(FOLLOW_UP_FALLBACK, |topic| topic.answer.as_str());
    PromptContent::new("Follow-up")
        .line(format!("You asked: {question}"))
        .line(answer)
        .action("Start again", PromptCommand::Restart)
        .with_input()
}
