use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use padron_app::{
    fields, Config, ConfirmChoice, FieldId, NoticeKind, ReferenceType, Session, SimulatedGateway,
    SubmitOutcome, UiLink, UiRequest,
};
use padron_core::{PhotoValidator, ScrfdDetector};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "padron", about = "Registro de visitantes e inquilinos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a photo for registration
    Check {
        /// Image file to check
        image: PathBuf,
    },
    /// Register a batch of people from a JSON description
    Batch {
        /// Batch file (see `padron batch --help` for the format)
        file: PathBuf,
        /// Answer "send" to the submission confirmation automatically
        #[arg(long)]
        yes: bool,
    },
    /// Print the field constraint table
    Fields,
}

/// One registration batch: shared property values plus the people to stage.
#[derive(Debug, Deserialize)]
struct BatchFile {
    unidad: String,
    referencia: Option<ReferenceType>,
    fecha_inicio: Option<NaiveDate>,
    fecha_fin: Option<NaiveDate>,
    personas: Vec<BatchPerson>,
}

#[derive(Debug, Deserialize)]
struct BatchPerson {
    apellido: String,
    nombre: String,
    documento: String,
    telefono: String,
    foto: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { image } => check_photo(&image),
        Commands::Batch { file, yes } => run_batch(&file, yes).await,
        Commands::Fields => {
            print_fields();
            Ok(())
        }
    }
}

fn load_validator(config: &Config) -> Result<PhotoValidator<ScrfdDetector>> {
    let detector =
        ScrfdDetector::load_with_confidence(&config.scrfd_model_path(), config.detector_confidence)?;
    Ok(PhotoValidator::new(detector))
}

fn check_photo(path: &Path) -> Result<()> {
    let config = Config::from_env();
    let mut validator = load_validator(&config)?;

    let photo = image::open(path)
        .with_context(|| format!("no se pudo abrir {}", path.display()))?
        .to_rgb8();

    match validator.validate(photo) {
        Ok(accepted) => {
            let (w, h) = accepted.dimensions();
            println!("Foto aceptada ({w}x{h})");
            Ok(())
        }
        Err(rejection) => anyhow::bail!("{rejection}"),
    }
}

async fn run_batch(file: &Path, auto_send: bool) -> Result<()> {
    let config = Config::from_env();
    let mut validator = load_validator(&config)?;

    let batch: BatchFile = serde_json::from_str(
        &std::fs::read_to_string(file)
            .with_context(|| format!("no se pudo leer {}", file.display()))?,
    )
    .context("formato de lote inválido")?;

    let (link, rx) = UiLink::channel(32);
    let presenter = tokio::spawn(run_presenter(rx, auto_send));
    let mut session = Session::new(link, SimulatedGateway::new(config.gateway_latency));

    for person in &batch.personas {
        let photo = image::open(&person.foto)
            .with_context(|| format!("no se pudo abrir {}", person.foto.display()))?
            .to_rgb8();
        let accepted = validator
            .validate(photo)
            .map_err(|rejection| anyhow::anyhow!("{}: {rejection}", person.foto.display()))?;

        let draft = session.draft_mut();
        draft.last_name = person.apellido.clone();
        draft.first_name = person.nombre.clone();
        draft.document_id = person.documento.clone();
        draft.phone = person.telefono.clone();
        draft.unit = batch.unidad.clone();
        draft.reference = batch.referencia;
        draft.lease_start = batch.fecha_inicio;
        draft.lease_end = batch.fecha_fin;
        draft.attach_photo(accepted);

        session
            .add_another()
            .await
            .map_err(|e| anyhow::anyhow!("{}, {}: {e}", person.apellido, person.nombre))?;
    }

    let outcome = session.submit().await;
    drop(session);
    presenter.await.ok();

    match outcome {
        SubmitOutcome::Delivered(cards) => {
            println!();
            for card in &cards {
                let (w, h) = card.photo.dimensions();
                println!("┌──────────────────────────────");
                println!("│ {}", card.name);
                println!("│ {}", card.unit_line());
                println!("│ Foto: {w}x{h}");
                println!("└──────────────────────────────");
            }
            println!("{} ID(s) generado(s)", cards.len());
            Ok(())
        }
        SubmitOutcome::Aborted => {
            println!("Envío cancelado; los datos guardados se conservan.");
            Ok(())
        }
        SubmitOutcome::Failed => anyhow::bail!("el envío falló; intente nuevamente"),
    }
}

/// Terminal presenter: prints notices, answers confirmations from stdin.
async fn run_presenter(mut rx: mpsc::Receiver<UiRequest>, auto_send: bool) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(request) = rx.recv().await {
        match request {
            UiRequest::Notify(notice) => {
                let tag = match notice.kind {
                    NoticeKind::Info => "info",
                    NoticeKind::Error => "error",
                    NoticeKind::Success => "ok",
                };
                println!("[{tag}] {}", notice.text);
            }
            UiRequest::Confirm { prompt, reply } => {
                let choice = if auto_send {
                    ConfirmChoice::Send
                } else {
                    println!("{}", prompt.intro);
                    for name in &prompt.staged_names {
                        println!("  - {name}");
                    }
                    println!("{}", prompt.question);
                    println!("  [1] {}", prompt.keep_label);
                    println!("  [2] {}", prompt.send_label);
                    ask_choice(&mut lines).await
                };
                let _ = reply.send(choice);
            }
        }
    }
}

async fn ask_choice(
    lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
) -> ConfirmChoice {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match line.trim() {
                "1" => return ConfirmChoice::KeepEditing,
                "2" => return ConfirmChoice::Send,
                _ => println!("Responda 1 o 2."),
            },
            // stdin closed: the safe answer is to keep editing.
            _ => return ConfirmChoice::KeepEditing,
        }
    }
}

fn print_fields() {
    for id in FieldId::ALL {
        match fields::rules(id) {
            Some(rules) => {
                let pattern = if rules.pattern.is_some() {
                    ", con patrón"
                } else {
                    ""
                };
                println!(
                    "{:<18} {}–{} caracteres{pattern}",
                    id.label(),
                    rules.min_len,
                    rules.max_len
                );
            }
            None => match id {
                FieldId::Reference => println!("{:<18} selección requerida", id.label()),
                _ => println!("{:<18} requerido según referencia", id.label()),
            },
        }
    }
}
