use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use simple_site::collection::{self, PostDraft, SectionDraft};
use simple_site::config::{self, SiteConfig};
use simple_site::controller::Controller;
use simple_site::editor::{self, ContentEditor, EditorError};
use simple_site::notice::Notice;
use simple_site::storage::{FileStore, KeyValueStore};
use simple_site::store::StateStore;
use simple_site::types::{AppState, EditorDocument, PartialAppState, Theme};
use simple_site::{builder, logging, output, render};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "simple-site")]
#[command(about = "Build a small personal website from the command line")]
#[command(long_about = "\
Build a small personal website from the command line

A site is a title, a colour theme, an ordered list of sections and the posts
filed under them. It is stored as JSON under the site root and renders to a
single self-contained HTML page.

Site root layout:

  ./
  ├── config.toml          # Optional, see 'simple-site gen-config'
  └── .simple-site/        # Store directory ([storage] dir)
      ├── dynamicWebsiteData.json
      └── websiteContent.json

Share links carry the whole site in the URL. Opening one shows the site
read-only and never overwrites your local copy.")]
#[command(version)]
struct Cli {
    /// Site root (holds config.toml and the store directory)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the store with the default site
    Init {
        /// Replace an existing site with the default one
        #[arg(long)]
        force: bool,
    },
    /// Print sections and the posts of the active section
    Show,
    /// Set the site title
    Title { text: String },
    /// Set the site description
    Description { text: String },
    /// Switch the colour theme
    Theme { theme: Theme },
    /// Switch between editing, previewing and plain viewing
    Mode { mode: Mode },
    /// Manage sections
    #[command(subcommand)]
    Section(SectionCommand),
    /// Manage posts in the active section
    #[command(subcommand)]
    Post(PostCommand),
    /// Print a share link for the current site
    Share,
    /// View a shared site (URL or bare token) without saving it
    Open {
        link: String,
        /// Also render the shared site to this HTML file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the site as JSON
    Export { file: PathBuf },
    /// Merge a previously exported JSON file into the site
    Import { file: PathBuf },
    /// Render the site to an HTML file
    Render {
        #[arg(long, default_value = "index.html")]
        output: PathBuf,
    },
    /// The single-document editor
    #[command(subcommand)]
    Editor(EditorCommand),
    /// Build a standalone page from a blocks JSON document
    Build {
        content: PathBuf,
        #[arg(long, default_value = "index.html")]
        output: PathBuf,
        #[arg(long, default_value = "Blog")]
        title: String,
        #[arg(long, default_value = "blue")]
        theme: Theme,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Edit,
    Preview,
    View,
}

#[derive(Subcommand)]
enum SectionCommand {
    /// Append a section
    Add {
        title: String,
        #[arg(long, default_value = "")]
        icon: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Make a section the active one (by id or title)
    Select { section: String },
    /// Change a section's labels
    Edit {
        section: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(clap::Args)]
struct PostArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    text: Option<String>,
    /// Image file or URL (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,
    /// Video file or URL (repeatable)
    #[arg(long = "video")]
    videos: Vec<String>,
}

#[derive(Subcommand)]
enum PostCommand {
    /// Add a post to the active section
    Add(PostArgs),
    /// Edit a post; given attachments replace the existing ones
    Edit {
        id: String,
        #[command(flatten)]
        post: PostArgs,
        /// Drop all attachments
        #[arg(long)]
        clear_media: bool,
    },
    /// Delete a post
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum EditorCommand {
    /// Change the document; saved like an auto-save (blank documents are not)
    Set {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        text: Option<String>,
        /// Picture or video file to embed
        #[arg(long)]
        media: Option<PathBuf>,
    },
    /// Remove the picture or video
    ClearMedia,
    /// Validate and save the document
    Submit,
    /// Validate, save, and render the output card
    Preview {
        #[arg(long, default_value = "preview.html")]
        output: PathBuf,
    },
    /// Print the saved document
    Show {
        /// Also render the output card to this HTML file
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.root)?;
    logging::init_logging(&site_config.logging, cli.verbose);
    let backend = FileStore::open(cli.root.join(&site_config.storage.dir))?;

    match cli.command {
        Command::Editor(cmd) => run_editor(cmd, backend, &site_config),
        Command::Build {
            content,
            output: out,
            title,
            theme,
        } => {
            let count = builder::build(&content, &out, &title, theme, &site_config)?;
            output::print_written(&format!("{count} blocks"), &out);
            Ok(())
        }
        Command::Init { force } => {
            let exists = backend.get(&site_config.storage.state_key)?.is_some();
            if exists && !force {
                println!("Site already initialized (use --force to reset)");
                return Ok(());
            }
            let mut store = StateStore::open(backend, &site_config.storage.state_key);
            store.merge(PartialAppState::from(AppState::default()));
            store.save()?;
            output::print_notices(&store.drain_notices());
            output::print_state_summary(store.state());
            Ok(())
        }
        command => {
            let store = StateStore::open(backend, &site_config.storage.state_key);
            let mut controller = Controller::new(store, &site_config);
            let ok = run_site(command, &mut controller, &site_config)?;
            output::print_notices(&controller.drain_notices());
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Commands on the site store. Returns `false` when the intent was
/// rejected; the reason is in the controller's notices.
fn run_site(
    command: Command,
    controller: &mut Controller<FileStore>,
    site_config: &SiteConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let ok = match command {
        Command::Show => {
            output::print_state_summary(controller.state());
            true
        }
        Command::Title { text } => {
            controller.edit_site_title(text, Instant::now());
            controller.flush()
        }
        Command::Description { text } => {
            controller.edit_site_description(text, Instant::now());
            controller.flush()
        }
        Command::Theme { theme } => controller.set_theme(theme),
        Command::Mode { mode } => match mode {
            Mode::Edit => controller.set_edit_mode(true),
            Mode::Preview => controller.set_preview_mode(true),
            Mode::View => controller.set_view_mode(),
        },
        Command::Section(cmd) => run_section(cmd, controller),
        Command::Post(cmd) => run_post(cmd, controller)?,
        Command::Share => {
            let url = controller.share_link();
            println!("{url}");
            true
        }
        Command::Open { link, output: out } => {
            let ok = controller.open_shared(&link);
            output::print_state_summary(controller.state());
            if ok && let Some(path) = out {
                let html = render::render_site(controller.state(), site_config).into_string();
                std::fs::write(&path, html)?;
                output::print_written("shared site", &path);
            }
            ok
        }
        Command::Export { file } => controller.export_file(&file),
        Command::Import { file } => controller.import_file(&file),
        Command::Render { output: out } => {
            let html = render::render_site(controller.state(), site_config).into_string();
            std::fs::write(&out, html)?;
            output::print_written("site", &out);
            true
        }
        Command::Init { .. } | Command::Editor(_) | Command::Build { .. } | Command::GenConfig => {
            unreachable!("handled in main")
        }
    };
    Ok(ok)
}

fn run_section(cmd: SectionCommand, controller: &mut Controller<FileStore>) -> bool {
    match cmd {
        SectionCommand::Add {
            title,
            icon,
            description,
        } => controller
            .add_section(SectionDraft {
                icon,
                title,
                description,
            })
            .is_some(),
        SectionCommand::Select { section } => match section_id(controller, &section) {
            Some(id) => controller.select_section(&id),
            None => false,
        },
        SectionCommand::Edit {
            section,
            title,
            icon,
            description,
        } => {
            let Some(id) = section_id(controller, &section) else {
                return false;
            };
            let Some(current) = collection::find_section(controller.state(), &id).cloned() else {
                return false;
            };
            let draft = SectionDraft {
                icon: icon.unwrap_or(current.icon),
                title: title.unwrap_or(current.title),
                description: description.unwrap_or(current.description),
            };
            controller.update_section(&current.id, draft)
        }
    }
}

/// Resolve a section by id or title, printing an error when there is none.
fn section_id(controller: &Controller<FileStore>, section: &str) -> Option<String> {
    let found = collection::find_section(controller.state(), section).map(|m| m.id.clone());
    if found.is_none() {
        output::print_notices(&[Notice::error(format!("no section '{section}'"))]);
    }
    found
}

fn run_post(
    cmd: PostCommand,
    controller: &mut Controller<FileStore>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let ok = match cmd {
        PostCommand::Add(post) => controller
            .submit_post(PostDraft {
                title: post.title.unwrap_or_default(),
                text: post.text.unwrap_or_default(),
                images: post.images,
                videos: post.videos,
            })
            .is_some(),
        PostCommand::Edit {
            id,
            post,
            clear_media,
        } => {
            let Some(mut draft) = controller.begin_edit(&id) else {
                return Ok(false);
            };
            if let Some(title) = post.title {
                draft.title = title;
            }
            if let Some(text) = post.text {
                draft.text = text;
            }
            if clear_media {
                draft.images.clear();
                draft.videos.clear();
            }
            if !post.images.is_empty() {
                draft.images = post.images;
            }
            if !post.videos.is_empty() {
                draft.videos = post.videos;
            }
            controller.submit_post(draft).is_some()
        }
        PostCommand::Delete { id, yes } => {
            if !controller.request_delete_post(&id) {
                return Ok(false);
            }
            let prompt = controller
                .pending_confirmation()
                .map(|p| p.prompt.clone())
                .unwrap_or_default();
            if yes || ask(&prompt)? {
                controller.confirm()
            } else {
                controller.cancel();
                println!("Cancelled");
                true
            }
        }
    };
    Ok(ok)
}

fn ask(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn run_editor(
    cmd: EditorCommand,
    backend: FileStore,
    site_config: &SiteConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = &site_config.storage.document_key;
    if let EditorCommand::Show { html } = cmd {
        let doc = editor::read_document(&backend, key).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "error loading saved content");
            None
        });
        output::print_document(doc.as_ref(), Utc::now());
        if let Some(path) = html {
            write_card(&path, doc.as_ref(), site_config)?;
        }
        return Ok(());
    }

    let mut ed = ContentEditor::open(
        backend,
        key.as_str(),
        site_config.media.clone(),
        site_config.autosave.delay(),
    );
    let now = Instant::now();
    let result = match cmd {
        EditorCommand::Set { title, text, media } => {
            if let Some(title) = title {
                ed.set_title(title, now);
            }
            if let Some(text) = text {
                ed.set_text(text, now);
            }
            let attached = match media {
                Some(path) => ed.attach_media(&path, now),
                None => Ok(()),
            };
            attached.and_then(|()| ed.flush().map(|_| ()))
        }
        EditorCommand::ClearMedia => {
            ed.remove_media(now);
            ed.flush().map(|_| ())
        }
        EditorCommand::Submit => ed.submit(),
        EditorCommand::Preview { output: out } => match ed.preview() {
            Ok(doc) => {
                let doc = doc.clone();
                write_card(&out, Some(&doc), site_config)?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        EditorCommand::Show { .. } => unreachable!("handled above"),
    };
    output::print_notices(&ed.drain_notices());
    if let Err(e) = result {
        if matches!(e, EditorError::Storage(_) | EditorError::Json(_)) {
            output::print_notices(&[Notice::error(e.to_string())]);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn write_card(
    path: &Path,
    doc: Option<&EditorDocument>,
    site_config: &SiteConfig,
) -> io::Result<()> {
    let html = render::render_document(doc, Utc::now(), site_config).into_string();
    std::fs::write(path, html)?;
    output::print_written("output card", path);
    Ok(())
}
