//! Solve command implementation for the Ecoroute CLI.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ecoroute_core::{DistanceMatrixProvider, SolveError, SolveResponse, Solver};
use ecoroute_data::{CostMetric, HttpDistanceMatrixProvider, HttpDistanceMatrixProviderConfig};
use ecoroute_fs::create_utf8_file;
use ecoroute_solver::LocalSearchSolver;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::plan::{PlanCosts, load_delivery_plan};
use crate::{
    ARG_SOLVE_API_KEY, ARG_SOLVE_DISTANCE_URL, ARG_SOLVE_METRIC, ARG_SOLVE_OUTPUT,
    ARG_SOLVE_PLAN, ARG_SOLVE_TIME_LIMIT, CliError, ENV_SOLVE_API_KEY, ENV_SOLVE_PLAN,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a delivery plan given as JSON. The plan carries the \
                 demands, the fleet's capacities and either a distance matrix \
                 or a list of locations, in which case the matrix is fetched \
                 from the Google Distance Matrix API. Options can come from \
                 CLI flags, configuration files, or environment variables.",
    about = "Plan routes for a delivery plan"
)]
#[ortho_config(prefix = "ECOROUTE")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing a delivery plan.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) plan_path: Option<Utf8PathBuf>,
    /// API key for the distance service; needed only for plans with locations.
    #[arg(long = ARG_SOLVE_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Override the distance service endpoint.
    #[arg(long = ARG_SOLVE_DISTANCE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) distance_url: Option<String>,
    /// Cost fetched for each pair of locations: `distance` or `duration`.
    #[arg(long = ARG_SOLVE_METRIC, value_name = "metric")]
    #[serde(default)]
    pub(crate) metric: Option<String>,
    /// Override the plan's search time limit, in milliseconds.
    #[arg(long = ARG_SOLVE_TIME_LIMIT, value_name = "ms")]
    #[serde(default)]
    pub(crate) time_limit_ms: Option<u64>,
    /// Write the response here instead of standard output.
    #[arg(long = ARG_SOLVE_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON delivery plan.
    pub(crate) plan_path: Utf8PathBuf,
    /// Distance service API key, when configured.
    pub(crate) api_key: Option<String>,
    /// Distance service endpoint.
    pub(crate) distance_url: String,
    /// Cost fetched for each pair of locations.
    pub(crate) metric: CostMetric,
    /// Search time limit overriding the plan's.
    pub(crate) time_limit: Option<Duration>,
    /// Output file; standard output when absent.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl fmt::Debug for SolveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolveConfig")
            .field("plan_path", &self.plan_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "REDACTED"))
            .field("distance_url", &self.distance_url)
            .field("metric", &self.metric)
            .field("time_limit", &self.time_limit)
            .field("output", &self.output)
            .finish()
    }
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.plan_path, ARG_SOLVE_PLAN)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match ecoroute_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// The configured key, or the error naming where to set one.
    fn require_api_key(&self) -> Result<&str, CliError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_SOLVE_API_KEY,
                env: ENV_SOLVE_API_KEY,
            })
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let plan_path = args.plan_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_PLAN,
            env: ENV_SOLVE_PLAN,
        })?;
        let metric = match args.metric.as_deref() {
            None | Some("distance") => CostMetric::Distance,
            Some("duration") => CostMetric::Duration,
            Some(other) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_SOLVE_METRIC,
                    value: other.to_owned(),
                    expected: "distance or duration",
                });
            }
        };
        let default_url = HttpDistanceMatrixProviderConfig::default().base_url;
        let distance_url = args.distance_url.unwrap_or(default_url);
        if distance_url.trim().is_empty() {
            return Err(CliError::InvalidArgument {
                field: ARG_SOLVE_DISTANCE_URL,
                value: distance_url,
                expected: "a URL",
            });
        }
        if args.time_limit_ms == Some(0) {
            return Err(CliError::InvalidArgument {
                field: ARG_SOLVE_TIME_LIMIT,
                value: "0".to_owned(),
                expected: "a positive number of milliseconds",
            });
        }

        Ok(Self {
            plan_path,
            api_key: args.api_key,
            distance_url,
            metric,
            time_limit: args.time_limit_ms.map(Duration::from_millis),
            output: args.output,
        })
    }
}

/// Builds the collaborators for the current solve invocation.
pub(crate) trait SolveComponents {
    fn solver(&self, config: &SolveConfig) -> Box<dyn Solver>;

    fn distance_provider(
        &self,
        config: &SolveConfig,
        api_key: &str,
    ) -> Result<Box<dyn DistanceMatrixProvider>, CliError>;
}

pub(crate) struct DefaultSolveComponents;

impl SolveComponents for DefaultSolveComponents {
    fn solver(&self, _config: &SolveConfig) -> Box<dyn Solver> {
        Box::new(LocalSearchSolver::new())
    }

    fn distance_provider(
        &self,
        config: &SolveConfig,
        api_key: &str,
    ) -> Result<Box<dyn DistanceMatrixProvider>, CliError> {
        let provider_config = HttpDistanceMatrixProviderConfig::new(api_key)
            .with_base_url(config.distance_url.clone())
            .with_metric(config.metric);
        let provider = HttpDistanceMatrixProvider::with_config(provider_config).map_err(
            |source| CliError::BuildDistanceProvider {
                base_url: config.distance_url.clone(),
                source,
            },
        )?;
        Ok(Box::new(provider))
    }
}

pub(crate) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &DefaultSolveComponents, &mut stdout)
}

pub(crate) fn run_solve_with(
    args: SolveArgs,
    components: &dyn SolveComponents,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_solve_config(args)?;
    let response = execute_solve(&config, components)?;
    match &config.output {
        Some(path) => {
            let mut file =
                create_utf8_file(path).map_err(|source| CliError::CreateSolveOutput {
                    path: path.clone(),
                    source,
                })?;
            write_solve_response(&mut file, &response)?;
            info!("wrote {} routes to {path}", response.routes.len());
            Ok(())
        }
        None => write_solve_response(stdout, &response),
    }
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn execute_solve(
    config: &SolveConfig,
    components: &dyn SolveComponents,
) -> Result<SolveResponse, CliError> {
    let plan = load_delivery_plan(&config.plan_path)?;
    let (costs, skeleton) = plan.into_parts(&config.plan_path)?;
    let distance_matrix = match costs {
        PlanCosts::Matrix(matrix) => matrix,
        PlanCosts::Locations(locations) => {
            let provider = components.distance_provider(config, config.require_api_key()?)?;
            info!(
                "fetching {} matrix for {} locations",
                config.metric,
                locations.len()
            );
            provider
                .distance_matrix(&locations)
                .map_err(|err| CliError::Solve {
                    source: SolveError::from(err),
                })?
        }
    };

    let mut request = skeleton.into_request(distance_matrix);
    if let Some(limit) = config.time_limit {
        request.parameters = request.parameters.with_time_limit(limit);
    }
    components
        .solver(config)
        .solve(&request)
        .map_err(|source| CliError::Solve { source })
}

fn write_solve_response(writer: &mut dyn Write, response: &SolveResponse) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(response).map_err(CliError::SerialiseSolveResponse)?;
    writeln!(writer, "{payload}").map_err(CliError::WriteSolveOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
