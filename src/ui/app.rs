use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::RosterClient;
use crate::marks::join_marks;
use crate::roster::{Roster, RosterError};

use super::forms::{input_line, push_mark_char, AlertState, StudentField, StudentForm};
use super::helpers::{centered_rect, format_average, key_hints};
use super::remote::{RemoteDispatcher, RemoteEvent};

/// Title line at the top of the screen.
const HEADER_HEIGHT: u16 = 1;
/// Class average, top student and current selection.
const SUMMARY_HEIGHT: u16 = 5;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE_STEP: isize = 5;

/// Fine-grained modes layered over the roster table.
enum Mode {
    Normal,
    AddingStudent(StudentForm),
    EditingMarks,
    ViewingStudent {
        student_id: String,
    },
    /// Blocking notice. Dismissing it returns to `resume`.
    Alert {
        alert: AlertState,
        resume: Box<Mode>,
    },
}

/// The roster view: owns the state container, the table cursor and the
/// channel that brings remote results back.
pub struct App {
    roster: Roster,
    remote: RemoteDispatcher,
    events: UnboundedReceiver<RemoteEvent>,
    fetch_started: bool,
    cursor: usize,
    mode: Mode,
    status: Option<String>,
}

impl App {
    /// Remote calls are spawned onto `runtime`; their results are applied by
    /// [`App::drain_remote_events`] or [`App::next_remote_event`].
    pub fn new(client: RosterClient, runtime: Handle) -> Self {
        let (remote, events) = RemoteDispatcher::new(client, runtime);
        Self {
            roster: Roster::new(),
            remote,
            events,
            fetch_started: false,
            cursor: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Kick off the initial roster fetch. Only the first call does anything.
    pub fn start(&mut self) {
        if self.fetch_started {
            return;
        }
        self.fetch_started = true;
        tracing::info!("fetching roster");
        self.remote.fetch_students();
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Message of the blocking notice currently on screen, if any.
    pub fn alert_message(&self) -> Option<&str> {
        match &self.mode {
            Mode::Alert { alert, .. } => Some(&alert.message),
            _ => None,
        }
    }

    /// Apply every remote result that has already arrived. Returns how many
    /// were applied.
    pub fn drain_remote_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply_remote(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next remote result and apply it.
    pub async fn next_remote_event(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.apply_remote(event);
                true
            }
            None => false,
        }
    }

    /// Reconcile a finished request with the current state. Failures only go
    /// to the diagnostic log.
    fn apply_remote(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::Loaded(Ok(students)) => {
                tracing::info!(count = students.len(), "roster loaded");
                self.roster.replace_all(students);
                self.clamp_cursor();
            }
            RemoteEvent::Loaded(Err(err)) => {
                tracing::error!(error = %err, "Error fetching students");
            }
            RemoteEvent::Created(Ok(student)) => {
                tracing::info!(student_id = %student.student_id, "student added");
                self.status = Some(format!("Added {} ({}).", student.name, student.student_id));
                self.roster.apply_created(student);
            }
            RemoteEvent::Created(Err(err)) => {
                tracing::error!(error = %err, "Error adding student");
            }
            RemoteEvent::MarksUpdated {
                student_id,
                result: Ok(student),
            } => {
                tracing::info!(student_id = %student_id, marks = student.marks.len(), "marks updated");
                self.status = Some(format!("Updated marks for {}.", student.name));
                self.roster.apply_marks_updated(&student_id, student);
                self.close_marks_editor();
                self.clamp_cursor();
            }
            RemoteEvent::MarksUpdated {
                student_id,
                result: Err(err),
            } => {
                tracing::error!(student_id = %student_id, error = %err, "Error updating marks");
            }
        }
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingStudent(form) => self.handle_add_student(code, form),
            Mode::EditingMarks => self.handle_edit_marks(code),
            Mode::ViewingStudent { student_id } => match code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('v') => Mode::Normal,
                _ => Mode::ViewingStudent { student_id },
            },
            Mode::Alert { alert, resume } => match code {
                KeyCode::Enter | KeyCode::Esc => *resume,
                _ => Mode::Alert { alert, resume },
            },
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.roster.students().len().saturating_sub(1),
            KeyCode::Enter => {
                if let Some(student_id) = self.highlighted_id() {
                    self.status = None;
                    self.roster.select(&student_id);
                    return Mode::EditingMarks;
                }
                self.status = Some("No students yet.".to_string());
            }
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.status = None;
                return Mode::AddingStudent(StudentForm::default());
            }
            KeyCode::Char('u') => {
                if self.roster.selected().is_some() {
                    return Mode::EditingMarks;
                }
                return alert(RosterError::NoSelection, Mode::Normal);
            }
            KeyCode::Char('v') => {
                if let Some(student_id) = self.highlighted_id() {
                    return Mode::ViewingStudent { student_id };
                }
                self.status = Some("No students yet.".to_string());
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_student(&mut self, code: KeyCode, mut form: StudentForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.status = Some("Add student cancelled.".to_string());
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(self.roster.draft_mut()),
            KeyCode::Enter => match self.roster.prepare_create() {
                Ok(draft) => {
                    tracing::debug!(student_id = %draft.student_id, "submitting new student");
                    self.remote.create_student(draft);
                    return Mode::Normal;
                }
                Err(err) => return alert(err, Mode::AddingStudent(form)),
            },
            KeyCode::Char(ch) => {
                form.push_char(self.roster.draft_mut(), ch);
            }
            _ => {}
        }
        Mode::AddingStudent(form)
    }

    fn handle_edit_marks(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => {
                self.roster.marks_draft_mut().pop();
            }
            KeyCode::Enter => match self.roster.prepare_marks_update() {
                Ok(update) => {
                    tracing::debug!(student_id = %update.student_id, "submitting marks");
                    self.remote.update_marks(update);
                    return Mode::Normal;
                }
                Err(err) => return alert(err, Mode::EditingMarks),
            },
            KeyCode::Char(ch) => {
                push_mark_char(self.roster.marks_draft_mut(), ch);
            }
            _ => {}
        }
        Mode::EditingMarks
    }

    /// The selection is gone once an update lands, so an open marks editor
    /// closes, including one waiting behind an alert.
    fn close_marks_editor(&mut self) {
        match &mut self.mode {
            Mode::Alert { resume, .. } if matches!(**resume, Mode::EditingMarks) => {
                **resume = Mode::Normal;
            }
            mode @ Mode::EditingMarks => *mode = Mode::Normal,
            _ => {}
        }
    }

    fn highlighted_id(&self) -> Option<String> {
        self.roster
            .students()
            .get(self.cursor)
            .map(|student| student.student_id.clone())
    }

    fn move_cursor(&mut self, offset: isize) {
        let len = self.roster.students().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + offset).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    fn clamp_cursor(&mut self) {
        let len = self.roster.students().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(SUMMARY_HEIGHT),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let header = Paragraph::new(Span::styled(
            "Student Marks Management System",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        self.draw_table(frame, chunks[1]);
        self.draw_summary(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);

        match &self.mode {
            Mode::AddingStudent(form) => self.draw_student_form(frame, area, form),
            Mode::EditingMarks => self.draw_marks_form(frame, area),
            Mode::ViewingStudent { student_id } => self.draw_student_detail(frame, area, student_id),
            Mode::Alert { alert, .. } => draw_alert(frame, area, alert),
            Mode::Normal => {}
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Students").borders(Borders::ALL);
        let students = self.roster.students();
        if students.is_empty() {
            let message = Paragraph::new("No students yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let selected_id = self.roster.selected().map(|s| s.student_id.as_str());
        let rows = students.iter().map(|student| {
            let is_selected = selected_id == Some(student.student_id.as_str());
            let marker = if is_selected { "* " } else { "  " };
            let row = Row::new(vec![
                Cell::from(format!("{marker}{}", student.student_id)),
                Cell::from(student.name.clone()),
                Cell::from(join_marks(&student.marks, ", ")),
                Cell::from(format_average(student.average())),
            ]);
            if is_selected {
                row.style(Style::default().fg(Color::Yellow))
            } else {
                row
            }
        });

        let header = Row::new(vec!["  ID", "Name", "Marks", "Average"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let widths = [
            Constraint::Percentage(15),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(15),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default().with_selected(Some(self.cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_summary(&self, frame: &mut Frame, area: Rect) {
        let summary = self.roster.summary();
        let mut lines = vec![Line::from(format!(
            "Class Average: {}",
            format_average(summary.class_average)
        ))];
        if let Some(top) = summary.top {
            lines.push(Line::from(format!(
                "Top Student: {} (Average: {})",
                top.student.name,
                format_average(top.average)
            )));
        }
        if let Some(selected) = self.roster.selected() {
            lines.push(Line::from(Span::styled(
                format!("Selected: {} ({})", selected.name, selected.student_id),
                Style::default().fg(Color::Yellow),
            )));
        }

        let block = Block::default().title("Class Summary").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = match &self.status {
            Some(text) => Line::from(Span::styled(text.clone(), Style::default().fg(Color::Green))),
            None => Line::from(""),
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::AddingStudent(_) => &[("Tab", "Switch Field"), ("Enter", "Add"), ("Esc", "Close")],
            Mode::EditingMarks => &[("Enter", "Update Marks"), ("Esc", "Close")],
            Mode::ViewingStudent { .. } | Mode::Alert { .. } => &[("Enter", "Dismiss")],
            Mode::Normal => &[
                ("↑↓", "Move"),
                ("Enter", "Select"),
                ("+", "Add Student"),
                ("u", "Update Marks"),
                ("v", "Details"),
                ("q", "Quit"),
            ],
        };
        Line::from(key_hints(hints))
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, form: &StudentForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add New Student").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let draft = self.roster.draft();
        let lines = vec![
            form.build_line(draft, "Student ID", StudentField::StudentId),
            form.build_line(draft, "Student Name", StudentField::Name),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to add • Tab to switch • Esc to close",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            StudentField::StudentId => ("Student ID: ", 0),
            StudentField::Name => ("Student Name: ", 1),
        };
        let cursor_x =
            inner.x + prefix.len() as u16 + StudentForm::value_len(draft, form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_marks_form(&self, frame: &mut Frame, area: Rect) {
        let Some(selected) = self.roster.selected() else {
            return;
        };
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Update Marks").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let marks = self.roster.marks_draft();
        let lines = vec![
            Line::from(format!("Marks: {marks}")),
            Line::from(format!("Student: {} ({})", selected.name, selected.student_id)),
            Line::from(""),
            Line::from(Span::styled(
                "Enter marks separated by commas • Enter to save • Esc to close",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + "Marks: ".len() as u16 + marks.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_student_detail(&self, frame: &mut Frame, area: Rect, student_id: &str) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let lines = match self.roster.find(student_id) {
            Some(student) => vec![
                Line::from(student.to_string()),
                Line::from(""),
                input_line("Marks", &join_marks(&student.marks, ", "), "<none>", false),
            ],
            None => vec![Line::from(format!("Student with ID {student_id} not found."))],
        };
        let block = Block::default().title("Student Summary").borders(Borders::ALL);
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            popup_area,
        );
    }
}

fn alert(err: RosterError, resume: Mode) -> Mode {
    Mode::Alert {
        alert: AlertState {
            message: err.to_string(),
        },
        resume: Box::new(resume),
    }
}

fn draw_alert(frame: &mut Frame, area: Rect, alert: &AlertState) {
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled("Notice", Style::default().fg(Color::Red)))
        .borders(Borders::ALL);
    let lines = vec![
        Line::from(alert.message.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to continue.",
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        popup_area,
    );
}
