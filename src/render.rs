use prettytable::{row, Table};

use crate::lifecycle::View;

/// Receives every view the client wants shown.
pub trait Renderer: Send {
    fn render(&mut self, view: &View);

    /// Show `view` even when it matches what was last shown.
    fn redraw(&mut self, view: &View) {
        self.render(view);
    }
}

/// Prints each new view to stdout as a table.
#[derive(Default)]
pub struct TableRenderer {
    last_view: Option<View>,
}

impl TableRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for TableRenderer {
    fn render(&mut self, view: &View) {
        if self.last_view.as_ref() == Some(view) {
            return;
        }
        view_table(view).printstd();
        self.last_view = Some(view.clone());
    }

    fn redraw(&mut self, view: &View) {
        self.last_view = None;
        self.render(view);
    }
}

pub fn view_table(view: &View) -> Table {
    let mut table = Table::new();

    match view {
        View::ConnectForm { params, last_error } => {
            table.add_row(row!["Connect", ""]);
            table.add_row(row!["Domain", params.domain]);
            table.add_row(row!["Room", params.room]);
            table.add_row(row!["Name", params.name]);
            if let Some(error) = last_error {
                table.add_row(row!["Last error", error]);
            }
            table.add_row(row!["", "type 'join' to connect, 'help' for commands"]);
        }

        View::Loading { params } => {
            table.add_row(row!["Loading", format!("joining {} on {}", params.room, params.domain)]);
        }

        View::Seats(layout) => {
            table.add_row(row!["Seat", "Name", "Participant", "Video track"]);
            for seat in &layout.seats {
                table.add_row(row![
                    format!("{}/{}", seat.index + 1, seat.total_count),
                    seat.user.name,
                    seat.user.id,
                    seat.track.id,
                ]);
            }

            table.add_row(row!["Audio", "", "Participant", "Audio track"]);
            for audio in &layout.audio {
                table.add_row(row![
                    audio.index + 1,
                    "",
                    audio.track.participant_id,
                    audio.track.id,
                ]);
            }
        }
    }

    table
}
