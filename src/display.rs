//! Terminal chart gallery using ratatui.
//!
//! Charts shown during a run are collected here and stay open together
//! until the user closes the gallery.

use crate::chart::{Chart, ChartSink, Panel};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart as ChartWidget, Dataset, GraphType, LegendPosition, Paragraph},
    Frame, Terminal,
};
use std::io;

/// Number of tick labels on the time axis
const X_TICKS: usize = 5;

/// Collects charts for the interactive viewer
#[derive(Debug, Default)]
pub struct Gallery {
    charts: Vec<Chart>,
    current: usize,
}

impl ChartSink for Gallery {
    fn show(&mut self, chart: Chart) -> Result<()> {
        self.charts.push(chart);
        Ok(())
    }
}

impl Gallery {
    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn current(&self) -> Option<&Chart> {
        self.charts.get(self.current)
    }

    pub fn next(&mut self) {
        if !self.charts.is_empty() {
            self.current = (self.current + 1) % self.charts.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.charts.is_empty() {
            self.current = (self.current + self.charts.len() - 1) % self.charts.len();
        }
    }

    /// Show the gallery until the user closes it
    pub fn run(mut self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal even when drawing failed
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => break,
                    KeyCode::Right | KeyCode::Char('n') | KeyCode::Char(' ') => self.next(),
                    KeyCode::Left | KeyCode::Char('p') => self.previous(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(6),    // Panels
                Constraint::Length(1), // Help bar
            ])
            .split(f.area());

        let Some(chart) = self.current() else {
            return;
        };

        let title = Paragraph::new(Span::styled(
            format!(" {} ", chart.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        f.render_widget(title, chunks[0]);

        let panel_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, chart.panels.len().max(1) as u32); chart.panels.len()])
            .split(chunks[1]);
        for (panel, area) in chart.panels.iter().zip(panel_areas.iter()) {
            render_panel(f, *area, panel, chart);
        }

        render_help_bar(f, chunks[2], self.current + 1, self.charts.len());
    }
}

/// Render one panel as a ratatui chart widget
fn render_panel(f: &mut Frame, area: Rect, panel: &Panel, chart: &Chart) {
    let (x_min, x_max) = panel.x_range();
    let (y_min, y_max) = panel.y_range();

    // Error bars become scatter points at both ends of each bar
    let error_ends: Vec<Vec<(f64, f64)>> = panel
        .traces
        .iter()
        .map(|t| match t.errors {
            Some(ref errors) => t
                .points
                .iter()
                .zip(errors)
                .flat_map(|(&(x, y), &e)| [(x, y - e.abs()), (x, y + e.abs())])
                .collect(),
            None => Vec::new(),
        })
        .collect();

    let mut datasets = Vec::new();
    for (trace, ends) in panel.traces.iter().zip(&error_ends) {
        let (r, g, b) = trace.color;
        let color = Color::Rgb(r, g, b);
        datasets.push(
            Dataset::default()
                .name(trace.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(&trace.points),
        );
        if !ends.is_empty() {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(color))
                    .data(ends),
            );
        }
    }

    let x_labels: Vec<Span> = (0..X_TICKS)
        .map(|i| chart.tick_label(x_min + (x_max - x_min) * i as f64 / (X_TICKS - 1) as f64))
        .map(Span::raw)
        .collect();
    let y_labels = vec![
        Span::raw(format!("{:.1}", y_min)),
        Span::raw(format!("{:.1}", y_max)),
    ];

    let mut x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([x_min, x_max])
        .labels(x_labels);
    if let Some(ref label) = panel.x_label {
        x_axis = x_axis.title(label.clone());
    }

    let mut y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(y_labels);
    if let Some(ref label) = panel.y_label {
        y_axis = y_axis.title(label.clone());
    }

    let legend = if panel.legend {
        Some(LegendPosition::TopRight)
    } else {
        None
    };

    let widget = ChartWidget::new(datasets)
        .block(Block::default().borders(Borders::ALL))
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(legend);
    f.render_widget(widget, area);
}

/// Render help bar at the bottom
fn render_help_bar(f: &mut Frame, area: Rect, position: usize, total: usize) {
    let text = format!(
        " Chart {}/{} | \u{2190}/p: Previous | \u{2192}/n: Next | q/Enter: Close all ",
        position, total
    );
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Gray));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Channel;

    fn chart(title: &str) -> Chart {
        Chart::multi_line(&[0.0, 900.0], &[Channel::new("A", vec![1.0, 2.0])], title)
    }

    #[test]
    fn test_gallery_collects_in_order() {
        let mut gallery = Gallery::default();
        assert!(gallery.is_empty());
        assert!(gallery.current().is_none());

        gallery.show(chart("first")).unwrap();
        gallery.show(chart("second")).unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.current().unwrap().title, "first");
    }

    #[test]
    fn test_gallery_paging_wraps() {
        let mut gallery = Gallery::default();
        for title in ["a", "b", "c"] {
            gallery.show(chart(title)).unwrap();
        }

        gallery.previous();
        assert_eq!(gallery.current().unwrap().title, "c");
        gallery.next();
        gallery.next();
        assert_eq!(gallery.current().unwrap().title, "b");
    }

    #[test]
    fn test_empty_gallery_paging_is_noop() {
        let mut gallery = Gallery::default();
        gallery.next();
        gallery.previous();
        assert!(gallery.current().is_none());
    }
}
