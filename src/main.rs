mod app;
mod cli;
mod config;
mod db;
mod error;
mod export;
mod logic;
mod models;
mod ui;

use app::{App, Screen};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use db::Database;
use error::Result;
use logic::ReminderService;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::screens::{CalendarScreen, CheckInScreen, DashboardScreen, PlantsScreen, SettingsScreen};

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Init) => {
            let (_, path) = Config::setup_interactive()?;
            println!("Run `plantiful` to start tracking. Config: {}", path.display());
            Ok(())
        }
        Some(Commands::Remind) => run_remind(&cli),
        Some(Commands::Export) => run_export(&cli),
        None => run_tui(&cli),
    }
}

fn run_remind(cli: &Cli) -> Result<()> {
    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    let service = ReminderService::new(db);
    let digests = service.digests()?;

    if digests.is_empty() {
        println!("No plants are due for care.");
        return Ok(());
    }

    for (i, digest) in digests.iter().enumerate() {
        if i > 0 {
            println!();
            println!("---");
            println!();
        }
        println!("{}", digest.render());
    }
    Ok(())
}

fn run_export(cli: &Cli) -> Result<()> {
    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    let user = match db.get_default_user()? {
        Some(u) => u,
        None => {
            eprintln!("No data to export yet. Run `plantiful` first.");
            std::process::exit(1);
        }
    };

    let scheduler = logic::CareScheduler::new(db.clone());
    let export = export::export_user(&db, &scheduler, &user)?;

    let stdout = io::stdout();
    export::write_json(stdout.lock(), &export)?;
    println!();
    Ok(())
}

fn run_tui(cli: &Cli) -> Result<()> {
    // First run walks through setup instead of failing on a missing config
    let config = if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config.clone())?
    } else {
        let (config, _) = Config::setup_interactive()?;
        config
    };

    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    let mut app = App::new(config, db)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| {
            let area = f.area();

            match app.screen {
                Screen::Dashboard => {
                    let screen = DashboardScreen::new(
                        &app.user,
                        &app.garden,
                        &app.summaries,
                        &app.recent_check_ins,
                        &app.plant_names,
                    )
                    .with_status(app.status_message.as_deref());
                    f.render_widget(screen, area);
                }
                Screen::Plants => {
                    let screen = PlantsScreen::new(&app.summaries)
                        .with_selection(app.plants_state.selected_index)
                        .adding(app.plants_state.adding, &app.plants_state.name_buffer);
                    f.render_widget(screen, area);
                }
                Screen::Calendar => {
                    let screen = CalendarScreen::new(&app.recent_check_ins, &app.plant_names)
                        .with_date(app.calendar_state.year, app.calendar_state.month)
                        .selected(app.calendar_state.selected_date);
                    f.render_widget(screen, area);
                }
                Screen::CheckIn => {
                    if let Some(ref form) = app.check_in_state {
                        let screen = CheckInScreen::new(form);
                        f.render_widget(screen, area);
                    }
                }
                Screen::Settings => {
                    let field_values = [
                        app.settings_field_value(ui::screens::SettingsField::OwnerFirstName),
                        app.settings_field_value(ui::screens::SettingsField::OwnerLastName),
                        app.settings_field_value(ui::screens::SettingsField::OwnerEmail),
                        app.settings_field_value(ui::screens::SettingsField::GardenName),
                        app.settings_field_value(ui::screens::SettingsField::CheckEvery),
                        app.settings_field_value(ui::screens::SettingsField::CheckUnit),
                    ];
                    let screen = SettingsScreen::new(field_values)
                        .with_focus(app.settings_state.focused_field)
                        .editing(app.settings_state.editing, &app.settings_state.edit_buffer);
                    f.render_widget(screen, area);
                }
            }
        })?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                // Global key handling
                match key.code {
                    KeyCode::Char('q') if !app.is_text_entry() => {
                        app.quit();
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit();
                    }
                    KeyCode::Esc
                        if !app.is_text_entry() && app.screen != Screen::CheckIn =>
                    {
                        app.switch_screen(Screen::Dashboard);
                        app.clear_status();
                    }
                    KeyCode::Char(c) if !app.is_text_entry() && app.screen != Screen::CheckIn => {
                        if let Some(screen) = Screen::from_key(c) {
                            app.switch_screen(screen);
                            app.clear_status();
                        } else {
                            handle_screen_input(app, key.code, key.modifiers)?;
                        }
                    }
                    _ => {
                        handle_screen_input(app, key.code, key.modifiers)?;
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_screen_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
    match app.screen {
        Screen::Dashboard => handle_dashboard_input(app, code),
        Screen::Plants => handle_plants_input(app, code),
        Screen::Calendar => handle_calendar_input(app, code),
        Screen::CheckIn => handle_check_in_input(app, code),
        Screen::Settings => handle_settings_input(app, code, modifiers),
    }
}

fn handle_dashboard_input(app: &mut App, code: KeyCode) -> Result<()> {
    if let KeyCode::Char('a') = code {
        app.switch_screen(Screen::Plants);
        app.plants_state.start_adding();
    }
    Ok(())
}

fn handle_plants_input(app: &mut App, code: KeyCode) -> Result<()> {
    if app.plants_state.adding {
        match code {
            KeyCode::Esc => app.plants_state.cancel_adding(),
            KeyCode::Enter => {
                let name = app.plants_state.finish_adding();
                app.add_plant(&name)?;
            }
            KeyCode::Backspace => {
                app.plants_state.name_buffer.pop();
            }
            KeyCode::Char(c) => {
                app.plants_state.name_buffer.push(c);
            }
            _ => {}
        }
        return Ok(());
    }

    let count = app.summaries.len();
    match code {
        KeyCode::Up => app.plants_state.prev(),
        KeyCode::Down => app.plants_state.next(count),
        KeyCode::Char('a') => app.plants_state.start_adding(),
        KeyCode::Char('c') => app.start_check_in(),
        KeyCode::Char('d') => app.delete_selected_plant()?,
        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_selected_frequency(1)?,
        KeyCode::Char('-') => app.adjust_selected_frequency(-1)?,
        KeyCode::Char('u') => app.toggle_selected_unit()?,
        _ => {}
    }
    Ok(())
}

fn handle_calendar_input(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Left => app.calendar_state.prev_month(),
        KeyCode::Right => app.calendar_state.next_month(),
        _ => {}
    }
    Ok(())
}

fn handle_check_in_input(app: &mut App, code: KeyCode) -> Result<()> {
    let Some(form) = app.check_in_state.as_mut() else {
        return Ok(());
    };

    match code {
        KeyCode::Esc => app.cancel_check_in(),
        KeyCode::Enter => app.submit_check_in()?,
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Char(' ') if !form.is_notes_focused() => form.toggle_focused(),
        KeyCode::Backspace if form.is_notes_focused() => {
            form.notes.pop();
        }
        KeyCode::Char(c) if form.is_notes_focused() => {
            form.notes.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_settings_input(app: &mut App, code: KeyCode, _modifiers: KeyModifiers) -> Result<()> {
    if app.settings_state.editing {
        match code {
            KeyCode::Esc => {
                app.settings_state.cancel_editing();
            }
            KeyCode::Enter => {
                let value = app.settings_state.finish_editing();
                let field = app.settings_state.focused_field;
                app.apply_settings_field(field, &value)?;
                app.reload()?;
            }
            KeyCode::Backspace => {
                app.settings_state.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                app.settings_state.edit_buffer.push(c);
            }
            _ => {}
        }
    } else {
        match code {
            KeyCode::Up => app.settings_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => app.settings_state.next_field(),
            KeyCode::Enter => {
                let current = app.settings_field_value(app.settings_state.focused_field);
                app.settings_state.start_editing(&current);
            }
            _ => {}
        }
    }
    Ok(())
}
