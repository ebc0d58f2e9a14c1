//! Fundacion CLI
//!
//! Command-line stand-in for the portal dashboards:
//! - Sign in / out (the token is kept in the cookie file)
//! - Donate and contact the foundation
//! - Work donor tickets, volunteering, workshops and news
//! - Manage accounts (admin)

use anyhow::bail;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use fundacion::api::dto::VolunteerOptionRequest;
use fundacion::client::error::MSG_SESSION_EXPIRED;
use fundacion::discovery::{candidates, discover_and_remember};
use fundacion::forms::{ContactForm, DonationForm, LoginForm, RegisterForm, ValidationErrors, VolunteerProposalForm};
use fundacion::store::{EventNewsDetails, VolunteerDetails};
use fundacion::tickets::{Conversation, TicketOwner};
use fundacion::{
    ApiClient, ClientError, Config, DiscoveryError, DonationKind, EventNewsKind, HttpProbe, Id,
    PageParams, ReviewStatus, Role, Session, TicketBoard, TicketFilter, TicketStatus,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "fundacion-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fundacion portal from the command line")]
#[command(long_about = "Donate, open support tickets, volunteer and register for workshops.\nAdmins also review tickets, proposals, accounts and publish news.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (skips backend discovery)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        email: String,
        /// Prompted for when omitted
        password: Option<String>,
    },

    /// Sign out and forget the session
    Logout,

    /// Create an account
    Register {
        name: String,
        email: String,
        password: String,
    },

    /// Show the signed-in account
    Whoami,

    /// Find a live backend and remember it
    Discover,

    /// Make a donation
    Donate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Amount, e.g. 25 or 12.50 (optional for goods)
        #[arg(long, default_value = "")]
        amount: String,
        #[arg(long)]
        currency: Option<String>,
        /// money or goods
        #[arg(long, default_value = "money")]
        kind: DonationKind,
        /// A message opens a support ticket
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Contact the foundation (opens a ticket)
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },

    /// Donations (admin, except `mine`)
    #[command(subcommand)]
    Donations(DonationsCommand),

    /// Donor support tickets
    #[command(subcommand)]
    Tickets(TicketsCommand),

    /// Volunteering
    #[command(subcommand)]
    Volunteers(VolunteersCommand),

    /// Workshops
    #[command(subcommand)]
    Workshops(WorkshopsCommand),

    /// Events and news
    #[command(subcommand)]
    News(NewsCommand),

    /// Accounts (admin)
    #[command(subcommand)]
    Users(UsersCommand),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum DonationsCommand {
    /// All donations
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Your own donations
    Mine,
    /// Export all donations as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TicketsCommand {
    /// List tickets (yours, or all for admins)
    List {
        /// open, closed or archived
        #[arg(short, long)]
        status: Option<TicketStatus>,
        /// Include archived tickets
        #[arg(short, long)]
        archived: bool,
        /// Match subject, donor name or email
        #[arg(long)]
        search: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show a ticket and its conversation
    Show { id: Id },
    /// Reply in a ticket
    Reply { id: Id, message: String },
    /// Close a ticket (admin)
    Close { id: Id },
    /// Archive a closed ticket (admin)
    Archive { id: Id },
    /// Step a ticket back: archived to closed, closed to open (admin)
    Reopen { id: Id },
}

#[derive(Subcommand)]
pub enum VolunteersCommand {
    /// Volunteering options
    Options,
    /// Enroll in an option
    Enroll {
        option_id: Id,
        #[arg(long)]
        note: Option<String>,
    },
    /// Your enrollments
    Mine,
    /// Propose a new opportunity
    Propose {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        location: String,
    },
    /// Proposals (yours, or all for admins)
    Proposals,
    /// Approve, reject or file a proposal (admin)
    Review { id: Id, status: ReviewStatus },
    /// Publish a volunteering option (admin)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        capacity: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum WorkshopsCommand {
    /// Upcoming workshops
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Take a seat in a workshop
    Register { id: Id },
    /// Give your seat back
    Unregister { id: Id },
}

#[derive(Subcommand)]
pub enum NewsCommand {
    /// Published events and news
    List {
        /// event or news
        #[arg(short = 't', long = "type")]
        kind: Option<EventNewsKind>,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Publish an event or news item (admin)
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// YYYY-MM-DD or RFC 3339 (default: now)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        /// event or news
        #[arg(short = 't', long = "type", default_value = "news")]
        kind: EventNewsKind,
    },
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// All accounts
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Change an account's role
    Role { id: Id, role: Role },
}

/// Backend access for one invocation
struct Portal<'a> {
    config: &'a Config,
    session: &'a Session,
    api_url: Option<String>,
}

impl Portal<'_> {
    async fn base_url(&self) -> anyhow::Result<String> {
        if let Some(url) = &self.api_url {
            return Ok(url.trim_end_matches('/').to_string());
        }
        let probe = HttpProbe::new(Duration::from_millis(self.config.client.probe_timeout_ms))?;
        let url = discover_and_remember(
            self.session,
            &self.config.client.api_url,
            &self.config.client.candidate_hosts,
            &probe,
        )
        .await?;
        Ok(url)
    }

    /// Client carrying the stored token, if there is one
    async fn client(&self) -> anyhow::Result<ApiClient> {
        let timeout = Duration::from_millis(self.config.client.request_timeout_ms);
        let mut client = ApiClient::new(self.base_url().await?, timeout)?;
        client.set_token(self.session.token()?);
        Ok(client)
    }

    /// Client for commands that need an account
    async fn signed_in(&self) -> anyhow::Result<ApiClient> {
        if self.session.token()?.is_none() {
            bail!("Not signed in. Run: fundacion-cli login <email>");
        }
        self.client().await
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load_with_env(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Config::load_default(),
    };
    if cli.verbose {
        config.logging.init();
    }

    let session = Session::with_cookie_file(&config.client.cookie_file);
    let portal = Portal {
        config: &config,
        session: &session,
        api_url: cli.api_url,
    };

    if let Err(e) = run(cli.command, &portal).await {
        report(&e, &session);
        std::process::exit(1);
    }
}

async fn run(command: Commands, portal: &Portal<'_>) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            };
            let request = LoginForm { email, password }.validate()?;
            let response = portal.client().await?.login(&request).await?;
            portal.session.login(&response.token)?;
            println!(
                "Signed in as {} <{}> ({})",
                response.user.name, response.user.email, response.user.role
            );
        }

        Commands::Logout => {
            if portal.session.token()?.is_some() {
                match portal.client().await?.logout().await {
                    Ok(()) | Err(ClientError::Unauthorized) => {}
                    Err(e) => tracing::warn!(error = %e, "Server-side logout failed"),
                }
            }
            portal.session.logout()?;
            println!("Signed out");
        }

        Commands::Register {
            name,
            email,
            password,
        } => {
            let request = RegisterForm {
                name,
                email,
                confirm_password: password.clone(),
                password,
            }
            .validate()?;
            let user = portal.client().await?.register(&request).await?;
            println!("Account #{} created for {}", user.id, user.email);
            println!("Sign in with: fundacion-cli login {}", user.email);
        }

        Commands::Whoami => {
            let user = portal.signed_in().await?.me().await?;
            println!("{:<10} {}", "ID", user.id);
            println!("{:<10} {}", "Name", user.name);
            println!("{:<10} {}", "Email", user.email);
            println!("{:<10} {}", "Role", user.role);
            println!("{:<10} {}", "Since", user.created_at.format("%Y-%m-%d"));
        }

        Commands::Discover => {
            let remembered = portal.session.api_base_url()?;
            let config = &portal.config.client;
            println!("Candidates:");
            for candidate in candidates(remembered.as_deref(), &config.api_url, &config.candidate_hosts) {
                println!("  {}", candidate);
            }
            let url = portal.base_url().await?;
            let health = portal.client().await?.health().await?;
            println!();
            println!("Backend: {} ({}, v{})", url, health.status, health.version);
        }

        Commands::Donate {
            name,
            email,
            amount,
            currency,
            kind,
            message,
        } => {
            let request = DonationForm {
                name,
                email,
                amount,
                currency,
                kind,
                message,
            }
            .validate()?;
            let donation = portal.client().await?.create_donation(&request).await?;
            println!(
                "Thank you! Donation #{} recorded: {}",
                donation.id,
                format_amount(donation.amount_cents, &donation.currency, donation.kind)
            );
            if let Some(ticket_id) = donation.ticket_id {
                println!("Your message opened ticket #{}", ticket_id);
            }
        }

        Commands::Contact {
            name,
            email,
            phone,
            subject,
            message,
        } => {
            let request = ContactForm {
                name,
                email,
                phone,
                subject,
                message,
            }
            .validate()?;
            let detail = portal.client().await?.create_ticket(&request).await?;
            println!("Ticket #{} opened: {}", detail.ticket.id, detail.ticket.subject);
        }

        Commands::Donations(cmd) => donations(cmd, portal).await?,
        Commands::Tickets(cmd) => tickets(cmd, portal).await?,
        Commands::Volunteers(cmd) => volunteers(cmd, portal).await?,
        Commands::Workshops(cmd) => workshops(cmd, portal).await?,
        Commands::News(cmd) => news(cmd, portal).await?,
        Commands::Users(cmd) => users(cmd, portal).await?,

        Commands::Config { output } => {
            let config = fundacion::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        if !parent.as_os_str().is_empty() {
                            std::fs::create_dir_all(parent)?;
                        }
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn donations(cmd: DonationsCommand, portal: &Portal<'_>) -> anyhow::Result<()> {
    let client = portal.signed_in().await?;

    let page = match cmd {
        DonationsCommand::List { page } => client.list_donations(PageParams::new(page, 20)).await?,
        DonationsCommand::Mine => client.my_donations(PageParams::default()).await?,
        DonationsCommand::Export { output } => {
            let csv = client.export_donations().await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &csv)?;
                    println!("Donations exported to {:?}", path);
                }
                None => print!("{}", csv),
            }
            return Ok(());
        }
    };

    if page.items.is_empty() {
        println!("No donations yet.");
        return Ok(());
    }

    println!("{:<6} {:<12} {:<24} {:<30} {}", "ID", "Date", "Donor", "Email", "Amount");
    println!("{}", "-".repeat(90));
    for d in &page.items {
        println!(
            "{:<6} {:<12} {:<24} {:<30} {}",
            d.id,
            d.created_at.format("%Y-%m-%d"),
            truncate(&d.donor_name, 24),
            truncate(&d.donor_email, 30),
            format_amount(d.amount_cents, &d.currency, d.kind)
        );
    }
    print_page_footer(page.page, page.total_pages, page.total_items);
    Ok(())
}

async fn tickets(cmd: TicketsCommand, portal: &Portal<'_>) -> anyhow::Result<()> {
    let mut board = TicketBoard::new(portal.signed_in().await?);

    match cmd {
        TicketsCommand::List {
            status,
            archived,
            search,
            page,
        } => {
            board.set_filter(TicketFilter {
                status,
                show_archived: archived,
                search,
            });
            board.refresh().await?;

            let page = board.page(page, 20);
            if page.items.is_empty() {
                println!("No tickets match.");
                return Ok(());
            }

            println!("{:<6} {:<10} {:<17} {:<30} {}", "ID", "Status", "Updated", "Subject", "Owner");
            println!("{}", "-".repeat(95));
            for t in &page.items {
                println!(
                    "{:<6} {:<10} {:<17} {:<30} {}",
                    t.id,
                    t.status,
                    t.updated_at.format("%Y-%m-%d %H:%M"),
                    truncate(&t.subject, 30),
                    TicketOwner::of(t).label()
                );
            }
            print_page_footer(page.page, page.total_pages, page.total_items);
        }

        TicketsCommand::Show { id } => {
            let conversation = board.open(id).await?;
            print_conversation(conversation);
        }

        TicketsCommand::Reply { id, message } => {
            if message.trim().is_empty() {
                bail!("Reply cannot be empty");
            }
            board.open(id).await?;
            let sent = board.reply(message.trim()).await?;
            println!("Reply #{} added to ticket #{}", sent.id, id);
        }

        TicketsCommand::Close { id } => {
            board.open(id).await?;
            let ticket = board.close().await?;
            println!("Ticket #{} is now {}", ticket.id, ticket.status);
        }

        TicketsCommand::Archive { id } => {
            board.open(id).await?;
            let ticket = board.archive().await?;
            println!("Ticket #{} is now {}", ticket.id, ticket.status);
        }

        TicketsCommand::Reopen { id } => {
            board.open(id).await?;
            let ticket = board.reopen().await?;
            println!("Ticket #{} is now {}", ticket.id, ticket.status);
        }
    }

    Ok(())
}

fn print_conversation(conversation: &Conversation) {
    let ticket = conversation.ticket();
    println!("Ticket #{}: {}", ticket.id, ticket.subject);
    println!("Status:  {}", ticket.status);
    println!("Owner:   {}", conversation.owner().label());
    if let Some(phone) = &ticket.donor_phone {
        println!("Phone:   {}", phone);
    }
    println!("Opened:  {}", ticket.created_at.format("%Y-%m-%d %H:%M"));
    if !conversation.is_writable() {
        println!("(archived, read-only)");
    }
    println!();

    for m in conversation.messages() {
        let sender = match m.sender_id {
            Some(id) => format!("user #{}", id),
            None => "visitor".to_string(),
        };
        println!("[{}] {}", m.created_at.format("%Y-%m-%d %H:%M"), sender);
        for line in m.body.lines() {
            println!("  {}", line);
        }
        println!();
    }
}

async fn volunteers(cmd: VolunteersCommand, portal: &Portal<'_>) -> anyhow::Result<()> {
    match cmd {
        VolunteersCommand::Options => {
            let page = portal.client().await?.list_options(PageParams::default()).await?;
            if page.items.is_empty() {
                println!("No volunteering options yet.");
                return Ok(());
            }

            println!("{:<6} {:<30} {:<20} {:<20} {:<10} {}", "ID", "Title", "Schedule", "Location", "Status", "Seats");
            println!("{}", "-".repeat(100));
            for o in &page.items {
                let seats = match o.capacity {
                    Some(c) => format!("{}/{}", o.enrolled, c),
                    None => format!("{}", o.enrolled),
                };
                println!(
                    "{:<6} {:<30} {:<20} {:<20} {:<10} {}",
                    o.id,
                    truncate(&o.title, 30),
                    truncate(&o.schedule, 20),
                    truncate(&o.location, 20),
                    o.status,
                    seats
                );
            }
        }

        VolunteersCommand::Enroll { option_id, note } => {
            let form = portal.signed_in().await?.enroll(option_id, note).await?;
            println!("Enrollment #{} in option #{} is {}", form.id, form.option_id, form.status);
        }

        VolunteersCommand::Mine => {
            let page = portal.signed_in().await?.my_enrollments(PageParams::default()).await?;
            if page.items.is_empty() {
                println!("You have not enrolled anywhere yet.");
                return Ok(());
            }
            println!("{:<6} {:<8} {:<10} {}", "ID", "Option", "Status", "Since");
            println!("{}", "-".repeat(40));
            for f in &page.items {
                println!(
                    "{:<6} {:<8} {:<10} {}",
                    f.id,
                    f.option_id,
                    f.status,
                    f.created_at.format("%Y-%m-%d")
                );
            }
        }

        VolunteersCommand::Propose {
            title,
            description,
            schedule,
            location,
        } => {
            let details = VolunteerProposalForm {
                title,
                description,
                schedule,
                location,
            }
            .validate()?;
            let proposal = portal.signed_in().await?.create_proposal(&details).await?;
            println!("Proposal #{} submitted ({})", proposal.id, proposal.status);
        }

        VolunteersCommand::Proposals => {
            let page = portal.signed_in().await?.list_proposals(PageParams::default()).await?;
            if page.items.is_empty() {
                println!("No proposals.");
                return Ok(());
            }
            println!("{:<6} {:<8} {:<30} {:<10} {}", "ID", "User", "Title", "Status", "Option");
            println!("{}", "-".repeat(70));
            for p in &page.items {
                println!(
                    "{:<6} {:<8} {:<30} {:<10} {}",
                    p.id,
                    p.user_id,
                    truncate(&p.title, 30),
                    p.status,
                    p.option_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
                );
            }
        }

        VolunteersCommand::Review { id, status } => {
            let proposal = portal.signed_in().await?.review_proposal(id, status).await?;
            println!("Proposal #{} is now {}", proposal.id, proposal.status);
            if let Some(option_id) = proposal.option_id {
                println!("Published as option #{}", option_id);
            }
        }

        VolunteersCommand::Create {
            title,
            description,
            schedule,
            location,
            capacity,
        } => {
            let request = VolunteerOptionRequest {
                details: VolunteerDetails {
                    title,
                    description,
                    schedule,
                    location,
                },
                capacity,
            };
            let option = portal.signed_in().await?.create_option(&request).await?;
            println!("Option #{} published: {}", option.id, option.title);
        }
    }

    Ok(())
}

async fn workshops(cmd: WorkshopsCommand, portal: &Portal<'_>) -> anyhow::Result<()> {
    match cmd {
        WorkshopsCommand::List { page } => {
            let page = portal
                .client()
                .await?
                .list_workshops(PageParams::new(page, 20))
                .await?;
            if page.items.is_empty() {
                println!("No workshops scheduled.");
                return Ok(());
            }

            println!("{:<6} {:<17} {:<30} {:<20} {}", "ID", "Date", "Title", "Location", "Seats left");
            println!("{}", "-".repeat(90));
            for w in &page.items {
                println!(
                    "{:<6} {:<17} {:<30} {:<20} {}/{}",
                    w.id,
                    w.date.format("%Y-%m-%d %H:%M"),
                    truncate(&w.title, 30),
                    truncate(&w.location, 20),
                    w.seats_left(),
                    w.capacity
                );
            }
            print_page_footer(page.page, page.total_pages, page.total_items);
        }

        WorkshopsCommand::Register { id } => {
            let registration = portal.signed_in().await?.register_workshop(id).await?;
            println!("Seat #{} booked in workshop #{}", registration.id, registration.workshop_id);
        }

        WorkshopsCommand::Unregister { id } => {
            portal.signed_in().await?.unregister_workshop(id).await?;
            println!("Seat in workshop #{} released", id);
        }
    }

    Ok(())
}

async fn news(cmd: NewsCommand, portal: &Portal<'_>) -> anyhow::Result<()> {
    match cmd {
        NewsCommand::List { kind, page } => {
            let page = portal
                .client()
                .await?
                .list_events_news(kind, PageParams::new(page, 20))
                .await?;
            if page.items.is_empty() {
                println!("Nothing published yet.");
                return Ok(());
            }

            for item in &page.items {
                println!(
                    "#{} [{}] {} - {}",
                    item.id,
                    item.kind,
                    item.date.format("%Y-%m-%d"),
                    item.title
                );
                println!("  {}", truncate(&item.description, 100));
                if let Some(url) = &item.image_url {
                    println!("  {}", url);
                }
            }
            print_page_footer(page.page, page.total_pages, page.total_items);
        }

        NewsCommand::Publish {
            title,
            description,
            date,
            image_url,
            kind,
        } => {
            let date = match date.as_deref() {
                None | Some("now") => Utc::now(),
                Some(s) => parse_date(s)?,
            };
            let details = EventNewsDetails {
                title,
                description,
                date,
                image_url,
                kind,
            };
            let item = portal.signed_in().await?.create_event_news(&details).await?;
            println!("Published {} #{}: {}", item.kind, item.id, item.title);
        }
    }

    Ok(())
}

async fn users(cmd: UsersCommand, portal: &Portal<'_>) -> anyhow::Result<()> {
    let client = portal.signed_in().await?;

    match cmd {
        UsersCommand::List { page } => {
            let page = client.list_users(PageParams::new(page, 20)).await?;
            println!("{:<6} {:<24} {:<30} {:<8} {}", "ID", "Name", "Email", "Role", "Since");
            println!("{}", "-".repeat(80));
            for u in &page.items {
                println!(
                    "{:<6} {:<24} {:<30} {:<8} {}",
                    u.id,
                    truncate(&u.name, 24),
                    truncate(&u.email, 30),
                    u.role,
                    u.created_at.format("%Y-%m-%d")
                );
            }
            print_page_footer(page.page, page.total_pages, page.total_items);
        }

        UsersCommand::Role { id, role } => {
            let user = client.set_role(id, role).await?;
            println!("{} is now {}", user.email, user.role);
        }
    }

    Ok(())
}

/// Print an error the way the dashboards would show it
fn report(err: &anyhow::Error, session: &Session) {
    if let Some(client_err) = err.downcast_ref::<ClientError>() {
        if client_err.is_unauthorized() {
            if let Err(e) = session.logout() {
                tracing::warn!(error = %e, "Could not clear the stored session");
            }
            eprintln!("{}. Sign in again with: fundacion-cli login <email>", MSG_SESSION_EXPIRED);
        } else {
            eprintln!("{}: {}", client_err.user_message(), client_err);
        }
        return;
    }

    if let Some(errors) = err.downcast_ref::<ValidationErrors>() {
        eprintln!("Please fix the form:");
        for e in errors.errors() {
            eprintln!("  {}: {}", e.field, e.message);
        }
        return;
    }

    if let Some(DiscoveryError::NoBackend { tried }) = err.downcast_ref::<DiscoveryError>() {
        eprintln!("Cannot find a running Fundacion API. Tried:");
        for url in tried {
            eprintln!("  {}", url);
        }
        eprintln!();
        eprintln!("Make sure the server is running:");
        eprintln!("  cargo run --bin fundacion");
        return;
    }

    eprintln!("Error: {:#}", err);
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn parse_date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        Some(naive) => Ok(naive.and_utc()),
        None => bail!("Invalid date: {}. Use YYYY-MM-DD or RFC 3339", s),
    }
}

fn format_amount(cents: i64, currency: &str, kind: DonationKind) -> String {
    if kind == DonationKind::Goods && cents == 0 {
        return "goods".to_string();
    }
    format!("{}.{:02} {}", cents / 100, cents % 100, currency)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn print_page_footer(page: usize, total_pages: usize, total_items: usize) {
    if total_pages > 1 {
        println!();
        println!("Page {} of {} ({} total)", page, total_pages.max(1), total_items);
    }
}
