use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, error, warn};

// 从 lib.rs 导入模块
use rust_classroom_client::components::{
    ActionOutcome, AllAssignments, ClassCard, Notice, PostCard,
};
use rust_classroom_client::config::AppConfig;
use rust_classroom_client::models::{
    classes::entities::Class, posts::entities::Post, submissions::requests::UploadFile,
};
use rust_classroom_client::runtime::{ClientContext, TerminalFeedback, prepare_client_startup};

#[derive(Parser, Debug)]
#[command(name = "classroom", version, about = "Classroom client", long_about = None)]
struct Cli {
    /// 自动确认所有提示
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 班级
    #[command(subcommand)]
    Classes(ClassCommand),
    /// 公告
    #[command(subcommand)]
    Posts(PostCommand),
    /// 评论
    #[command(subcommand)]
    Comments(CommentCommand),
    /// 作业
    #[command(subcommand)]
    Assignments(AssignmentCommand),
}

#[derive(Subcommand, Debug)]
enum ClassCommand {
    Delete {
        #[arg(long)]
        id: String,
        /// 确认框中显示的班级名称
        #[arg(long, default_value = "this class")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum PostCommand {
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        message: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
struct PostRef {
    #[arg(long = "post")]
    post_id: String,
}

#[derive(Subcommand, Debug)]
enum CommentCommand {
    List {
        #[command(flatten)]
        post: PostRef,
    },
    Add {
        #[command(flatten)]
        post: PostRef,
        #[arg(long)]
        message: String,
    },
    Edit {
        #[command(flatten)]
        post: PostRef,
        #[arg(long)]
        id: String,
        #[arg(long)]
        message: String,
    },
    Delete {
        #[command(flatten)]
        post: PostRef,
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum AssignmentCommand {
    List {
        #[arg(long = "class")]
        class_id: String,
    },
    Delete {
        #[arg(long = "class")]
        class_id: String,
        #[arg(long)]
        id: String,
    },
    Submit {
        #[arg(long = "class")]
        class_id: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
}

/// 只知道 id 时构造的公告，内容在编辑时整体替换
fn post_stub(id: String) -> Post {
    Post {
        id,
        class_id: String::new(),
        message: String::new(),
        time: Utc::now(),
    }
}

fn exit_code(outcome: &ActionOutcome) -> ExitCode {
    match outcome {
        ActionOutcome::Done | ActionOutcome::Declined => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

async fn run_classes(ctx: &ClientContext, command: ClassCommand) -> ExitCode {
    match command {
        ClassCommand::Delete { id, name } => {
            let class = Class {
                id,
                name,
                ..Class::default()
            };
            let card = ClassCard::new(ctx, class);
            exit_code(&card.delete().await)
        }
    }
}

async fn run_posts(ctx: &ClientContext, command: PostCommand) -> ExitCode {
    match command {
        PostCommand::Edit { id, message } => {
            let card = PostCard::new(ctx, post_stub(id));
            card.start_edit();
            if let Err(e) = card.set_edit_text(message) {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
            let outcome = card.save().await;
            if outcome.is_done() {
                print!("{}", card.render());
            }
            exit_code(&outcome)
        }
        PostCommand::Delete { id } => {
            let card = PostCard::new(ctx, post_stub(id));
            exit_code(&card.delete().await)
        }
    }
}

async fn run_comments(ctx: &ClientContext, command: CommentCommand) -> ExitCode {
    let post_id = match &command {
        CommentCommand::List { post }
        | CommentCommand::Add { post, .. }
        | CommentCommand::Edit { post, .. }
        | CommentCommand::Delete { post, .. } => post.post_id.clone(),
    };
    let card = PostCard::new(ctx, post_stub(post_id));
    card.toggle_comments();
    if let Err(e) = card.load_comments().await {
        ctx.feedback
            .notify(Notice::error(
                "Error!",
                e.user_message("Failed to load comments"),
            ))
            .await;
        return ExitCode::FAILURE;
    }

    let outcome = match command {
        CommentCommand::List { .. } => ActionOutcome::Done,
        CommentCommand::Add { message, .. } => {
            card.set_new_comment(message);
            card.add_comment().await
        }
        CommentCommand::Edit { id, message, .. } => match card.start_comment_edit(&id) {
            ActionOutcome::Done => {
                if let Err(e) = card.set_comment_edit_text(message) {
                    error!("{}", e);
                    return ExitCode::FAILURE;
                }
                card.save_comment_edit().await
            }
            other => other,
        },
        CommentCommand::Delete { id, .. } => card.delete_comment(&id).await,
    };

    print!("{}", card.render());
    exit_code(&outcome)
}

async fn run_assignments(ctx: &ClientContext, command: AssignmentCommand) -> ExitCode {
    let class_id = match &command {
        AssignmentCommand::List { class_id }
        | AssignmentCommand::Delete { class_id, .. }
        | AssignmentCommand::Submit { class_id, .. } => class_id.clone(),
    };
    let list = AllAssignments::new(ctx, class_id);
    if let Err(e) = list.load().await {
        ctx.feedback
            .notify(Notice::error(
                "Error!",
                e.user_message("Failed to load assignments"),
            ))
            .await;
        return ExitCode::FAILURE;
    }

    let outcome = match command {
        AssignmentCommand::List { .. } => ActionOutcome::Done,
        AssignmentCommand::Delete { id, .. } => list.delete(&id).await,
        AssignmentCommand::Submit { id, file, .. } => {
            let Some(card) = list.card(&id) else {
                error!("Assignment {} is not listed", id);
                return ExitCode::FAILURE;
            };
            let upload = match UploadFile::from_path(&file).await {
                Ok(upload) => upload,
                Err(e) => {
                    error!("Failed to read {}: {}", file.display(), e);
                    return ExitCode::FAILURE;
                }
            };
            card.open_upload();
            match card.select_file(upload).await {
                ActionOutcome::Done => card.submit().await,
                other => other,
            }
        }
    };

    print!("{}", list.render());
    exit_code(&outcome)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();

    let app_start_time = Utc::now();
    let cli = Cli::parse();

    // 初始化配置
    setup_panic!();
    if let Err(e) = AppConfig::init() {
        eprintln!("Failed to initialize configuration: {e}");
        return ExitCode::FAILURE;
    }
    let config = AppConfig::get();

    // 初始化日志，输出到 stderr，避免与渲染结果混在一起
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    warn!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let feedback = Arc::new(TerminalFeedback::new(cli.yes));
    let ctx = match prepare_client_startup(config, feedback) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.format_simple());
            return ExitCode::FAILURE;
        }
    };

    debug!(
        "Startup completed in {} ms",
        Utc::now()
            .signed_duration_since(app_start_time)
            .num_milliseconds()
    );

    match cli.command {
        Command::Classes(command) => run_classes(&ctx, command).await,
        Command::Posts(command) => run_posts(&ctx, command).await,
        Command::Comments(command) => run_comments(&ctx, command).await,
        Command::Assignments(command) => run_assignments(&ctx, command).await,
    }
}
