//! Application rendering.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, StatefulWidget, Widget};

use lazytree_core::Node;

use crate::theme::Theme;
use crate::ui::{AppLayout, HelpOverlay, TreeState, TreeView};

use super::AppMode;

/// Render context containing the state needed for rendering.
pub struct RenderContext<'a> {
    pub mode: AppMode,
    pub theme: &'a Theme,
    pub roots: &'a [Node],
    /// Number of listings dispatched but not yet applied.
    pub in_flight: usize,
    /// Number of volumes skipped during root enumeration.
    pub warnings: usize,
}

/// Main render function for the application.
pub fn render_app(ctx: &RenderContext, tree_state: &mut TreeState, area: Rect, buf: &mut Buffer) {
    let base_style = Style::default()
        .bg(ctx.theme.background)
        .fg(ctx.theme.foreground);
    buf.set_style(area, base_style);

    let layout = AppLayout::new(area);

    render_header(ctx, layout.header, buf);
    render_tree(ctx, tree_state, layout.main, buf);
    render_footer(ctx, layout.footer, buf);

    if ctx.mode == AppMode::Help {
        HelpOverlay::new(ctx.theme).render(area, buf);
    }
}

fn render_header(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let title = Span::styled(" lazytree ", ctx.theme.title.add_modifier(Modifier::BOLD));

    let roots = Span::styled(
        format!(" {} roots ", ctx.roots.len()),
        ctx.theme.header,
    );

    let loading = if ctx.in_flight > 0 {
        Span::styled(
            format!(" {} loading ", ctx.in_flight),
            Style::default().fg(ctx.theme.background).bg(ctx.theme.info),
        )
    } else {
        Span::raw("")
    };

    let warnings = if ctx.warnings > 0 {
        Span::styled(
            format!(" {} volumes skipped ", ctx.warnings),
            Style::default().fg(ctx.theme.error),
        )
    } else {
        Span::raw("")
    };

    let line = Line::from(vec![title, roots, loading, warnings]);
    Paragraph::new(line).style(ctx.theme.header).render(area, buf);
}

fn render_tree(ctx: &RenderContext, tree_state: &mut TreeState, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(ctx.theme.border);

    if ctx.roots.is_empty() {
        let message = if ctx.in_flight > 0 {
            "Enumerating drives..."
        } else {
            "No drives found"
        };
        Paragraph::new(Span::styled(message, Style::default().fg(ctx.theme.muted)))
            .block(block)
            .render(area, buf);
        return;
    }

    TreeView::new(ctx.roots, ctx.theme)
        .block(block)
        .render(area, buf, tree_state);
}

fn render_footer(ctx: &RenderContext, area: Rect, buf: &mut Buffer) {
    let hints = [
        ("j/k", "move"),
        ("l", "expand"),
        ("h", "collapse"),
        ("R", "reload"),
        ("t", "theme"),
        ("?", "help"),
        ("q", "quit"),
    ];

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!(" {key}"), ctx.theme.help_key),
                Span::styled(format!(" {desc} "), ctx.theme.footer),
            ]
        })
        .collect();

    Paragraph::new(Line::from(spans))
        .style(ctx.theme.footer)
        .render(area, buf);
}
