//! Render loop: projects the current sketch/game state onto a ratatui
//! canvas. Pure view code; nothing here mutates model state.
//!
//! Paint order per frame: playfield background, domain content (strokes
//! or birds + score pops), hand skeleton overlay, then chrome in normal
//! screen orientation. Everything inside the canvas lives in mirrored
//! sensor space; the mirroring already happened when landmarks were
//! projected, so the canvas just draws what the model holds.

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect as UiRect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points, Rectangle},
        Block, Borders, Paragraph,
    },
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{App, Mode};
use fingerpaint::landmarks::LandmarkSet;

const STROKE_COLOR: Color = Color::Cyan;
const BIRD_COLOR: Color = Color::Yellow;
const POP_COLOR: Color = Color::Magenta;
const SKELETON_COLOR: Color = Color::DarkGray;
const BUTTON_COLOR: Color = Color::Red;

// Landmark chains whose consecutive pairs form the skeleton bones:
// thumb, index, middle, ring, pinky, then the knuckle arc.
const BONE_CHAINS: [&[usize]; 6] = [
    &[0, 1, 2, 3, 4],
    &[0, 5, 6, 7, 8],
    &[9, 10, 11, 12],
    &[13, 14, 15, 16],
    &[0, 17, 18, 19, 20],
    &[5, 9, 13, 17],
];

pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_chrome(app, f, chunks[0]);
    render_playfield(app, f, chunks[1]);
    render_help(app, f, chunks[2]);
}

fn render_chrome(app: &App, f: &mut Frame, area: UiRect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let status = match app.mode {
        Mode::Draw => format!("fingerpaint · {}", app.info()),
        Mode::Birds => {
            let session = &app.game.session;
            format!(
                "fingerpaint · score {} · {:>3}s · {}",
                session.score,
                session.time_remaining,
                app.info()
            )
        }
    };

    let line = Paragraph::new(Span::styled(fit(&status, area.width as usize), bold))
        .alignment(Alignment::Left);
    f.render_widget(line, area);
}

fn render_help(app: &App, f: &mut Frame, area: UiRect) {
    let dim = Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC);
    let mut help = match app.mode {
        Mode::Draw => "point to draw · (c)lear · (q)uit".to_string(),
        Mode::Birds => "point to hit · (s)tart · (r)estart · (q)uit".to_string(),
    };
    if app.sim.is_some() {
        help.push_str(" · arrows move · 1 point 2 fist 3 open 0 away");
    }

    let line = Paragraph::new(Span::styled(fit(&help, area.width as usize), dim))
        .alignment(Alignment::Center);
    f.render_widget(line, area);
}

fn render_playfield(app: &App, f: &mut Frame, area: UiRect) {
    let width = app.config.playfield_width;
    let height = app.config.playfield_height;

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            match app.mode {
                Mode::Draw => paint_sketch(app, ctx, height),
                Mode::Birds => paint_game(app, ctx, width, height),
            }
            if let Some(hand) = &app.latest {
                paint_skeleton(hand, ctx, width, height);
            }
        });
    f.render_widget(canvas, area);
}

fn paint_sketch(app: &App, ctx: &mut Context, height: f64) {
    let button = &app.sketch.clear_button;
    ctx.draw(&Rectangle {
        x: button.x,
        y: height - button.y - button.height,
        width: button.width,
        height: button.height,
        color: BUTTON_COLOR,
    });
    ctx.print(
        button.x + 2.0,
        height - button.y - button.height / 2.0,
        Line::styled("CLEAR", Style::default().fg(BUTTON_COLOR)),
    );

    for stroke in &app.sketch.strokes {
        match stroke.as_slice() {
            [] => {}
            // A degenerate one-point stroke still renders.
            [only] => ctx.draw(&Points {
                coords: &[(only.x, height - only.y)],
                color: STROKE_COLOR,
            }),
            points => {
                for (a, b) in points.iter().tuple_windows() {
                    ctx.draw(&CanvasLine {
                        x1: a.x,
                        y1: height - a.y,
                        x2: b.x,
                        y2: height - b.y,
                        color: STROKE_COLOR,
                    });
                }
            }
        }
    }
}

fn paint_game(app: &App, ctx: &mut Context, width: f64, height: f64) {
    for bird in &app.game.birds {
        ctx.draw(&ratatui::widgets::canvas::Circle {
            x: bird.x,
            y: height - bird.y,
            radius: bird.radius,
            color: BIRD_COLOR,
        });
    }

    for pop in &app.game.pops {
        ctx.print(
            pop.x,
            height - pop.y,
            Line::styled(
                format!("+{}", pop.value),
                Style::default().fg(POP_COLOR).add_modifier(Modifier::BOLD),
            ),
        );
    }

    let session = &app.game.session;
    if !session.started {
        ctx.print(
            width / 2.0 - 24.0,
            height / 2.0,
            Line::styled(
                "press (s) to start",
                Style::default().add_modifier(Modifier::BOLD),
            ),
        );
    } else if session.game_over {
        ctx.print(
            width / 2.0 - 40.0,
            height / 2.0,
            Line::styled(
                format!("game over · score {} · (r) to restart", session.score),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }
}

fn paint_skeleton(hand: &LandmarkSet, ctx: &mut Context, width: f64, height: f64) {
    for chain in BONE_CHAINS {
        for (&a, &b) in chain.iter().tuple_windows() {
            let pa = hand.point(a).to_screen(width, height, true);
            let pb = hand.point(b).to_screen(width, height, true);
            ctx.draw(&CanvasLine {
                x1: pa.x,
                y1: height - pa.y,
                x2: pb.x,
                y2: height - pb.y,
                color: SKELETON_COLOR,
            });
        }
    }
}

/// Truncate to the rendered width of the target area.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + 1 >= width {
            out.push('…');
            break;
        }
        out.push(c);
    }
    out
}
