use crate::commands::{run_batch, run_predict, BatchArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_approval::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Approval Predictor",
    about = "Serve and run loan approval predictions from the command line",
    version
)]
struct Cli {
    #[command(flatten)]
    artifacts: ArtifactArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Predict approval for a single applicant
    Predict(PredictArgs),
    /// Score every applicant in a loan dataset CSV
    Batch(BatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ArtifactArgs {
    /// Override the trained model artifact (LOAN_MODEL_PATH)
    #[arg(long, global = true)]
    pub(crate) model: Option<PathBuf>,
    /// Override the fitted scaler artifact (LOAN_SCALER_PATH)
    #[arg(long, global = true)]
    pub(crate) scaler: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, cli.artifacts).await,
        Command::Predict(args) => run_predict(args, cli.artifacts),
        Command::Batch(args) => run_batch(args, cli.artifacts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["loan-approval-api"]).expect("parses");
        assert!(cli.command.is_none());
        assert!(cli.artifacts.model.is_none());
    }

    #[test]
    fn predict_defaults_match_the_intake_form() {
        let cli = Cli::try_parse_from(["loan-approval-api", "predict"]).expect("parses");
        let Some(Command::Predict(args)) = cli.command else {
            panic!("expected predict command");
        };
        assert_eq!(args.form(), loan_approval::prediction::LoanApplicationForm::default());
        assert!(!args.json);
    }

    #[test]
    fn predict_accepts_field_overrides_and_global_artifacts() {
        let cli = Cli::try_parse_from([
            "loan-approval-api",
            "predict",
            "--gender",
            "Female",
            "--dependents",
            "3+",
            "--education",
            "Not Graduate",
            "--credit-history",
            "0",
            "--applicant-income",
            "-10",
            "--model",
            "/tmp/forest.json",
            "--json",
        ])
        .expect("parses");

        assert_eq!(cli.artifacts.model, Some(PathBuf::from("/tmp/forest.json")));
        let Some(Command::Predict(args)) = cli.command else {
            panic!("expected predict command");
        };
        let form = args.form();
        assert_eq!(form.gender, "Female");
        assert_eq!(form.dependents, "3+");
        assert_eq!(form.education, "Not Graduate");
        assert_eq!(form.credit_history, 0.0);
        assert_eq!(form.applicant_income, -10.0);
        assert!(args.json);
    }

    #[test]
    fn batch_requires_an_input_file() {
        assert!(Cli::try_parse_from(["loan-approval-api", "batch"]).is_err());
        let cli = Cli::try_parse_from(["loan-approval-api", "batch", "--input", "loans.csv"])
            .expect("parses");
        let Some(Command::Batch(args)) = cli.command else {
            panic!("expected batch command");
        };
        assert_eq!(args.input, PathBuf::from("loans.csv"));
    }

    #[test]
    fn serve_overrides_host_and_port() {
        let cli = Cli::try_parse_from([
            "loan-approval-api",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
        ])
        .expect("parses");
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
    }
}
