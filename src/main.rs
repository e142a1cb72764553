use anyhow::Context;
use chrono::Local;
use clap::Parser;
use jurnal_bimbingan::autosave::{self, AutosaveTimer};
use jurnal_bimbingan::cli::{Cli, Commands, DraftAction};
use jurnal_bimbingan::config::Config;
use jurnal_bimbingan::error::{JurnalError, Result};
use jurnal_bimbingan::file_store::FileBackend;
use jurnal_bimbingan::prompt::{ConsoleNotifier, DialogConfirm};
use jurnal_bimbingan::{print, signature_file};
use jurnal_common::notify::{messages, Confirm, Notifier, Toast};
use jurnal_common::record::{FormField, FormState, SignatureRole};
use jurnal_common::render::HistoryItemView;
use jurnal_common::{history, Debouncer, DecodedSignature, Error, FormSession, RecordStore};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

type Session = FormSession<FileBackend>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = Config::load()?;

    let mut notifier = ConsoleNotifier::default();

    match cli.command {
        Commands::New { student_sig, teacher_sig } => {
            println!("📝 {}\n", jurnal_common::render::TITLE);
            let session = open_session(&config, cli.data_file)?;
            run_new(&config, session, student_sig, teacher_sig, &mut notifier).await?;
        }

        Commands::Save { input, student_sig, teacher_sig } => {
            let form = read_form(&input)?;
            let mut session = open_session(&config, cli.data_file)?;
            let now = autosave::now();

            for field in FormField::ALL {
                session.edit_field(field, form.get(field), now);
            }
            for (role, data) in [
                (SignatureRole::Student, form.student_signature.as_deref()),
                (SignatureRole::Teacher, form.teacher_signature.as_deref()),
            ] {
                if let Some(data) = data {
                    let decoded = DecodedSignature::decode(data)?;
                    session.draw_signature(role, &decoded, now);
                }
            }
            load_signatures(&mut session, student_sig, teacher_sig).await?;

            let key = session.save(&mut notifier)?;
            println!("{}", key);
        }

        Commands::List { search } => {
            let store = open_store(&config, cli.data_file)?;
            let listing = history::list_summaries(&store)?;
            let shown: Vec<_> = match &search {
                Some(query) => history::filter(&listing.entries, query),
                None => listing.entries.iter().collect(),
            };

            if shown.is_empty() {
                println!("Belum ada riwayat bimbingan.");
            } else {
                println!("Riwayat bimbingan ({} data):\n", shown.len());
                for entry in shown {
                    println!("{}\n", HistoryItemView::from_entry(entry).to_text());
                }
            }
            if !listing.skipped.is_empty() {
                eprintln!("⚠ {} data rusak dilewati", listing.skipped.len());
            }
        }

        Commands::Show { key } => {
            let session = open_session(&config, cli.data_file)?;
            let doc = session.view_history(&key, &mut notifier)?;
            println!("{}", doc.to_text());
        }

        Commands::Print { key, draft, output } => {
            let mut session = open_session(&config, cli.data_file)?;
            let (doc, record) = match key {
                Some(key) if !draft => {
                    let entry = history::view(session.store(), &key).inspect_err(|e| {
                        if matches!(e, Error::NotFound(_)) {
                            notifier.notify(Toast::error(messages::NOT_FOUND));
                        }
                    })?;
                    (print::print_document(&entry.record)?, entry.record)
                }
                _ => {
                    if !session.restore_draft()? {
                        println!("Tidak ada draf.");
                        return Ok(());
                    }
                    let doc = session.print(&mut notifier)?;
                    (doc, session.validate()?)
                }
            };

            let output = output.unwrap_or_else(|| print::default_file_name(&record));
            print::write_html(&doc, &output)?;
            println!("✔ Dokumen cetak: {}", output.display());
        }

        Commands::Delete { key, yes } => {
            let mut session = open_session(&config, cli.data_file)?;
            let mut confirm = DialogConfirm::new(yes);
            if !session.delete_history(&key, &mut confirm, &mut notifier)? {
                println!("Dibatalkan.");
            }
        }

        Commands::Clear { yes } => {
            let mut session = open_session(&config, cli.data_file)?;
            let mut confirm = DialogConfirm::new(yes);
            match session.clear_history(&mut confirm, &mut notifier)? {
                Some(removed) => debug!("{} records removed", removed),
                None => println!("Dibatalkan."),
            }
        }

        Commands::Draft { action } => {
            let mut store = open_store(&config, cli.data_file)?;
            match action {
                DraftAction::Show => match store.load_draft()? {
                    Some(draft) => print_draft(&draft),
                    None => println!("Tidak ada draf."),
                },
                DraftAction::Clear => {
                    store.clear_draft()?;
                    println!("✔ Draf dihapus");
                }
            }
        }

        Commands::Migrate => {
            let mut store = open_store(&config, cli.data_file)?;
            let migrated = store.migrate_legacy()?;
            println!("✔ {} data dipindahkan ke format baru", migrated);
        }

        Commands::Config { show, set_data_file } => {
            if let Some(path) = set_data_file {
                config.set_data_file(path)?;
                println!("✔ File data diatur");
            }

            if show {
                println!("Konfigurasi:");
                println!("  File data: {}", config.data_file()?.display());
                println!("  Ukuran pad: {}x{}", config.pad_width, config.pad_height);
                println!("  Jeda simpan otomatis: {} ms", config.autosave_delay_ms);
                println!("  Kuota penyimpanan: {} bytes", config.storage_quota_bytes);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn open_store(config: &Config, data_file: Option<PathBuf>) -> Result<RecordStore<FileBackend>> {
    let path = match data_file {
        Some(path) => path,
        None => config.data_file()?,
    };
    let backend = FileBackend::open(&path)?.with_quota(config.storage_quota_bytes);
    Ok(RecordStore::new(backend))
}

fn open_session(config: &Config, data_file: Option<PathBuf>) -> Result<Session> {
    let store = open_store(config, data_file)?;
    let today = Local::now().date_naive();
    Ok(FormSession::new(store, config.pad_width, config.pad_height, today)
        .with_autosave(Debouncer::new(config.autosave_delay())))
}

fn read_form(path: &Path) -> anyhow::Result<FormState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("gagal membaca {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} bukan form JSON yang valid", path.display()))
}

fn lock(session: &Mutex<Session>) -> Result<MutexGuard<'_, Session>> {
    session
        .lock()
        .map_err(|_| JurnalError::Task("sesi form tidak dapat dikunci".into()))
}

async fn load_signatures(
    session: &mut Session,
    student_sig: Option<PathBuf>,
    teacher_sig: Option<PathBuf>,
) -> Result<()> {
    for (role, path) in [(SignatureRole::Student, student_sig), (SignatureRole::Teacher, teacher_sig)] {
        if let Some(path) = path {
            let input = signature_file::load(&path).await?;
            signature_file::apply(session, role, &input, autosave::now());
        }
    }
    Ok(())
}

/// Ask for one field on the blocking pool, prefilled with `initial`.
async fn prompt_field(field: FormField, initial: String) -> Result<String> {
    let prompt = if field.is_multiline() {
        format!("{} (satu baris)", field.label())
    } else {
        field.label().to_string()
    };
    tokio::task::spawn_blocking(move || {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map_err(|e| JurnalError::Task(e.to_string()))?
    .map_err(JurnalError::from)
}

async fn run_new(
    config: &Config,
    mut session: Session,
    student_sig: Option<PathBuf>,
    teacher_sig: Option<PathBuf>,
    notifier: &mut ConsoleNotifier,
) -> Result<()> {
    match session.restore_draft() {
        Ok(true) => println!("✔ Draf sebelumnya dipulihkan\n"),
        Ok(false) => {}
        Err(e) => warn!("draft not restored: {}", e),
    }

    let session = Arc::new(Mutex::new(session));
    let mut timer = AutosaveTimer::new(config.autosave_delay());

    for field in FormField::ALL {
        let current = lock(&session)?.form().get(field).to_string();
        let value = prompt_field(field, current).await?;
        lock(&session)?.edit_field(field, value, autosave::now());
        autosave::schedule_draft(&mut timer, &session);
    }

    for (role, path) in [(SignatureRole::Student, student_sig), (SignatureRole::Teacher, teacher_sig)] {
        let Some(path) = path else {
            continue;
        };
        let input = signature_file::load(&path).await?;
        signature_file::apply(&mut *lock(&session)?, role, &input, autosave::now());
        autosave::schedule_draft(&mut timer, &session);
    }
    timer.cancel();

    let mut guard = lock(&session)?;
    let doc = match guard.preview(notifier) {
        Ok(doc) => doc,
        Err(e) => {
            guard.flush_draft()?;
            println!("Draf disimpan; jalankan `jurnal new` lagi untuk melanjutkan.");
            return Err(e.into());
        }
    };
    println!("\n{}", doc.to_text());

    let mut confirm = DialogConfirm::default();
    if confirm.confirm("Simpan jurnal ini?") {
        let key = guard.save(notifier)?;
        println!("{}", key);
    } else {
        guard.flush_draft()?;
        println!("Draf disimpan.");
    }
    Ok(())
}

fn print_draft(draft: &FormState) {
    println!("Draf:");
    for field in FormField::ALL {
        println!("  {}: {}", field.label(), draft.get(field));
    }
    for (role, data) in [
        (SignatureRole::Student, &draft.student_signature),
        (SignatureRole::Teacher, &draft.teacher_signature),
    ] {
        let status = if data.is_some() { "ada" } else { "kosong" };
        println!("  Tanda tangan {}: {}", role, status);
    }
}
