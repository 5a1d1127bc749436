use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use pitch_journey::{DataLoader, HeadlessController, PitchEngine, pacing};

use crate::scenario::{Script, ScriptStep, apply};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Plays scripts against fresh headless controllers.
pub struct ScriptRunner<L: DataLoader> {
    engine: PitchEngine<L>,
    verbose: bool,
    realtime: bool,
}

impl<L: DataLoader> ScriptRunner<L> {
    pub const fn new(engine: PitchEngine<L>, verbose: bool, realtime: bool) -> Self {
        Self {
            engine,
            verbose,
            realtime,
        }
    }

    pub async fn run_scenario(&self, script: &Script, iterations: usize) -> ScenarioResult {
        if self.verbose {
            println!(
                "🧪 Testing scenario: {} ({} steps)",
                script.name.bright_white(),
                script.steps.len()
            );
        }

        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            match self.run_once(script).await {
                Ok(()) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!("  ✅ Iteration {}/{} passed ({duration:?})", i + 1, iterations);
                    }
                }
                Err(err) => {
                    let message = format!("Iteration {}: {err:#}", i + 1);
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: script.name.clone(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }

    async fn run_once(&self, script: &Script) -> Result<()> {
        let mut ctl = self.engine.create_headless()?;
        for (index, step) in script.steps.iter().enumerate() {
            self.perform(&mut ctl, step)
                .await
                .with_context(|| format!("step {} ({})", index + 1, step.label()))?;
        }
        Ok(())
    }

    async fn perform(&self, ctl: &mut HeadlessController, step: &ScriptStep) -> Result<()> {
        match step {
            ScriptStep::Wait { ms } if self.realtime => {
                let fired = pacing::play_for(ctl, *ms).await;
                log::debug!("waited {ms} ms in real time, {fired} tasks fired");
                Ok(())
            }
            _ => apply(ctl, step),
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Expectation;
    use crate::scenario::catalog::find_scenario;
    use pitch_journey::{BundledLoader, Journey, Step};

    fn runner(realtime: bool) -> ScriptRunner<BundledLoader> {
        ScriptRunner::new(PitchEngine::new(BundledLoader), false, realtime)
    }

    #[tokio::test]
    async fn smoke_passes_every_iteration() {
        let script = find_scenario("smoke").unwrap();
        let result = runner(false).run_scenario(&script, 3).await;
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.successful_iterations, 3);
        assert_eq!(result.performance_data.len(), 3);
    }

    #[tokio::test]
    async fn failures_name_the_step() {
        let script = Script::new("broken", "")
            .then(ScriptStep::Begin {
                journey: Journey::A,
            })
            .expect(Expectation::Step {
                step: Some(Step::B1),
            });
        let result = runner(false).run_scenario(&script, 2).await;
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].contains("step 2"));
        assert_eq!(result.average_duration, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_waits_fire_scheduled_tasks() {
        let script = find_scenario("auto-advance").unwrap();
        let result = runner(true).run_scenario(&script, 1).await;
        assert!(result.passed, "{:?}", result.failures);
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "smoke".to_string(),
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
    }
}
