use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::StudentDraft;

/// Focus state of the "add student" form. The typed values live in the
/// roster's draft so they survive closing the popup.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) active: StudentField,
}

/// Fields available within the student form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum StudentField {
    #[default]
    StudentId,
    Name,
}

impl StudentForm {
    /// Swap focus between the id and name fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            StudentField::StudentId => StudentField::Name,
            StudentField::Name => StudentField::StudentId,
        };
    }

    /// Append a character to the active field of `draft`.
    pub(crate) fn push_char(&self, draft: &mut StudentDraft, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        field_mut(draft, self.active).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&self, draft: &mut StudentDraft) {
        field_mut(draft, self.active).pop();
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(
        &self,
        draft: &StudentDraft,
        field_name: &str,
        field: StudentField,
    ) -> Line<'static> {
        let value = match field {
            StudentField::StudentId => &draft.student_id,
            StudentField::Name => &draft.name,
        };
        input_line(field_name, value, "<required>", self.active == field)
    }

    /// Character count of the requested field, used to place the cursor.
    pub(crate) fn value_len(draft: &StudentDraft, field: StudentField) -> usize {
        match field {
            StudentField::StudentId => draft.student_id.chars().count(),
            StudentField::Name => draft.name.chars().count(),
        }
    }
}

fn field_mut(draft: &mut StudentDraft, field: StudentField) -> &mut String {
    match field {
        StudentField::StudentId => &mut draft.student_id,
        StudentField::Name => &mut draft.name,
    }
}

/// Marks input accepts digits, separators and signs only.
pub(crate) fn push_mark_char(marks: &mut String, ch: char) -> bool {
    if ch.is_ascii_digit() || matches!(ch, ',' | ' ' | '-' | '+') {
        marks.push(ch);
        true
    } else {
        false
    }
}

/// Labelled input line: yellow when focused, a grey placeholder when empty.
pub(crate) fn input_line(
    field_name: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// A blocking notice that must be dismissed before anything else happens.
pub(crate) struct AlertState {
    pub(crate) message: String,
}
