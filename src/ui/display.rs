//! Monochrome renderer for [`View`]s on any `embedded-graphics` target.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::String;

use super::{DisplaySink, View};
use crate::config::DEVICE_NAME;
use crate::error::Error;
use crate::peer::Peer;

/// Height of the inverted status bar.
const STATUS_BAR_HEIGHT: u32 = 14;

/// Peer rows visible below the status bar.
const LIST_ROWS: usize = 3;
const LIST_TOP: i32 = 17;
const LIST_ROW_HEIGHT: i32 = 11;

const CELL_SIZE: u32 = 24;
const CELL_SPACING: i32 = 6;
const CELL_LEFT: i32 = 8;
const CELL_TOP: i32 = 20;

/// FONT_6X10 glyphs that fit between the left margin and the panel edge.
const ROW_CHARS: usize = 20;

const FOOTER: &str = "Back: hold OK";

/// Flushes a frame buffer to the glass.
pub trait Present {
    fn present(&mut self) -> Result<(), Error>;
}

/// [`DisplaySink`] drawing onto a buffered monochrome target.
pub struct OledSink<D> {
    target: D,
}

impl<D> OledSink<D>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions + Present,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    fn width(&self) -> i32 {
        self.target.size().width as i32
    }

    fn height(&self) -> i32 {
        self.target.size().height as i32
    }

    fn text(&mut self, text: &str, at: Point, style: MonoTextStyle<'static, BinaryColor>) -> Result<(), Error> {
        Text::with_baseline(text, at, style, Baseline::Top)
            .draw(&mut self.target)
            .map(|_| ())
            .map_err(|_| Error::Display)
    }

    fn centered(&mut self, text: &str, y: i32, style: MonoTextStyle<'static, BinaryColor>) -> Result<(), Error> {
        let layout = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(text, Point::new(self.width() / 2, y), style, layout)
            .draw(&mut self.target)
            .map(|_| ())
            .map_err(|_| Error::Display)
    }

    fn rect(&mut self, rect: Rectangle, style: PrimitiveStyle<BinaryColor>) -> Result<(), Error> {
        rect.into_styled(style)
            .draw(&mut self.target)
            .map_err(|_| Error::Display)
    }

    fn status_bar(&mut self, title: &str) -> Result<(), Error> {
        let bar = Rectangle::new(Point::zero(), Size::new(self.width() as u32, STATUS_BAR_HEIGHT));
        self.rect(bar, PrimitiveStyle::with_fill(BinaryColor::On))?;
        self.text(title, Point::new(2, 2), inverted_style())
    }

    fn footer(&mut self) -> Result<(), Error> {
        let y = self.height() - 12;
        self.text(FOOTER, Point::new(0, y), small_style())
    }

    fn ble_glyph(&mut self, center: Point) -> Result<(), Error> {
        let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        let segments = [
            (Point::new(0, -8), Point::new(0, 8)),
            (Point::new(-6, -4), Point::new(6, 4)),
            (Point::new(6, -4), Point::new(-6, 4)),
        ];
        for (a, b) in segments {
            Line::new(center + a, center + b)
                .into_styled(stroke)
                .draw(&mut self.target)
                .map_err(|_| Error::Display)?;
        }
        Ok(())
    }

    fn draw_message(&mut self, message: &str) -> Result<(), Error> {
        let y = self.height() / 2;
        self.centered(message, y, small_style())
    }

    fn draw_ble_status(&mut self, status: &str) -> Result<(), Error> {
        self.centered(DEVICE_NAME, 11, title_style())?;
        let mid = Point::new(self.width() / 2, 32);
        self.ble_glyph(mid)?;
        let y = self.height() - 6;
        self.centered(status, y, small_style())
    }

    fn draw_ble_control(&mut self) -> Result<(), Error> {
        self.text("IG Reels Remote", Point::new(0, 2), small_style())?;
        self.text("[UP] Next [DOWN] Prev", Point::new(0, 16), small_style())?;
        self.text("[OK] Like", Point::new(0, 28), small_style())?;
        let glyph = Point::new(self.width() / 2, 42);
        self.ble_glyph(glyph)?;
        let y = self.height() - 10;
        self.text("Hold OK to exit.", Point::new(0, y), small_style())
    }

    fn draw_menu(&mut self, entries: &[&str], selected: usize) -> Result<(), Error> {
        self.status_bar(DEVICE_NAME)?;
        for (row, entry) in entries.iter().enumerate().take(LIST_ROWS) {
            let line = menu_row(entry, row == selected);
            let y = LIST_TOP + row as i32 * LIST_ROW_HEIGHT;
            self.text(&line, Point::new(4, y), small_style())?;
        }
        Ok(())
    }

    fn draw_peer_list(&mut self, title: &str, peers: &[Peer], selected: usize) -> Result<(), Error> {
        self.status_bar(title)?;
        let first = first_visible_row(selected, LIST_ROWS);
        for (row, (index, peer)) in peers.iter().enumerate().skip(first).take(LIST_ROWS).enumerate() {
            let line = peer_row(peer, index == selected);
            let y = LIST_TOP + row as i32 * LIST_ROW_HEIGHT;
            self.text(&line, Point::new(4, y), small_style())?;
        }
        self.footer()
    }

    fn draw_switch_grid(&mut self, title: &str, switches: &[bool], focused: usize) -> Result<(), Error> {
        self.status_bar(title)?;
        for (i, &on) in switches.iter().enumerate() {
            let origin = Point::new(CELL_LEFT + i as i32 * (CELL_SIZE as i32 + CELL_SPACING), CELL_TOP);
            let cell = Rectangle::new(origin, Size::new_equal(CELL_SIZE));
            if i == focused {
                let frame = Rectangle::new(origin - Point::new(2, 2), Size::new_equal(CELL_SIZE + 4));
                self.rect(frame, PrimitiveStyle::with_stroke(BinaryColor::On, 1))?;
            }
            let fill = if on { BinaryColor::On } else { BinaryColor::Off };
            self.rect(cell, PrimitiveStyle::with_fill(fill))?;
            self.rect(cell, PrimitiveStyle::with_stroke(BinaryColor::On, 1))?;

            let label = if on { "ON" } else { "OFF" };
            let style = if on { inverted_style() } else { small_style() };
            let layout = TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Middle)
                .build();
            Text::with_text_style(label, cell.center(), style, layout)
                .draw(&mut self.target)
                .map_err(|_| Error::Display)?;
        }
        self.footer()
    }
}

impl<D> DisplaySink for OledSink<D>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions + Present,
{
    fn show(&mut self, view: &View<'_>) -> Result<(), Error> {
        self.target
            .clear(BinaryColor::Off)
            .map_err(|_| Error::Display)?;
        match *view {
            View::Message(message) => self.draw_message(message)?,
            View::BleStatus { status } => self.draw_ble_status(status)?,
            View::BleControl => self.draw_ble_control()?,
            View::Menu { entries, selected } => self.draw_menu(entries, selected)?,
            View::PeerList {
                title,
                peers,
                selected,
            } => self.draw_peer_list(title, peers, selected)?,
            View::SwitchGrid {
                title,
                switches,
                focused,
            } => self.draw_switch_grid(title, switches, focused)?,
        }
        self.target.present()
    }
}

fn small_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

fn inverted_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::Off)
        .background_color(BinaryColor::On)
        .build()
}

fn title_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_10X20)
        .text_color(BinaryColor::On)
        .build()
}

/// First row of a `rows`-high window that keeps `selected` visible.
fn first_visible_row(selected: usize, rows: usize) -> usize {
    (selected + 1).saturating_sub(rows)
}

/// "> name [rssi]" for the selected peer, "  name [rssi]" otherwise.
/// Marker plus as much of `entry` as fits on one row.
fn menu_row(entry: &str, selected: bool) -> String<ROW_CHARS> {
    let mut line = String::new();
    let marker = if selected { '>' } else { ' ' };
    for c in [marker, ' '].into_iter().chain(entry.chars()) {
        if line.push(c).is_err() {
            break;
        }
    }
    line
}

fn peer_row(peer: &Peer, selected: bool) -> String<48> {
    let mut line = String::new();
    let marker = if selected { "> " } else { "  " };
    let _ = write!(line, "{}{} [{}]", marker, peer.ssid, peer.rssi);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::{MacAddress, Peer};
    use frame::Frame;

    mod frame {
        use super::super::Present;
        use crate::error::Error;
        use embedded_graphics::pixelcolor::BinaryColor;
        use embedded_graphics::prelude::*;

        /// 128×64 in-memory frame buffer.
        pub struct Frame {
            pub pixels: [[bool; 128]; 64],
            pub presents: usize,
        }

        impl Frame {
            pub fn new() -> Self {
                Self {
                    pixels: [[false; 128]; 64],
                    presents: 0,
                }
            }

            pub fn on(&self, x: usize, y: usize) -> bool {
                self.pixels[y][x]
            }
        }

        impl OriginDimensions for Frame {
            fn size(&self) -> Size {
                Size::new(128, 64)
            }
        }

        impl DrawTarget for Frame {
            type Color = BinaryColor;
            type Error = core::convert::Infallible;

            fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
            where
                I: IntoIterator<Item = Pixel<Self::Color>>,
            {
                for Pixel(p, c) in pixels {
                    if (0..128).contains(&p.x) && (0..64).contains(&p.y) {
                        self.pixels[p.y as usize][p.x as usize] = c.is_on();
                    }
                }
                Ok(())
            }
        }

        impl Present for Frame {
            fn present(&mut self) -> Result<(), Error> {
                self.presents += 1;
                Ok(())
            }
        }
    }

    fn peer(name: &str, rssi: i8) -> Peer {
        Peer {
            mac: MacAddress::default(),
            ssid: crate::peer::truncate_name(name),
            rssi,
            online: false,
        }
    }

    #[test]
    fn every_show_presents_once() {
        let mut sink = OledSink::new(Frame::new());
        sink.show(&View::Message("Scanning...")).unwrap();
        sink.show(&View::BleControl).unwrap();
        assert_eq!(sink.target().presents, 2);
    }

    #[test]
    fn status_bar_is_inverted() {
        let mut sink = OledSink::new(Frame::new());
        let peers = [peer("ESP32-A", -40)];
        sink.show(&View::PeerList {
            title: "Select Device",
            peers: &peers,
            selected: 0,
        })
        .unwrap();
        // Corner of the bar is lit, row just below it is not.
        assert!(sink.target().on(0, 0));
        assert!(sink.target().on(127, 13));
        assert!(!sink.target().on(127, 14));
    }

    #[test]
    fn switch_cells_fill_when_on_and_frame_focus() {
        let mut sink = OledSink::new(Frame::new());
        sink.show(&View::SwitchGrid {
            title: "ESP32-A",
            switches: &[true, false, false, false],
            focused: 1,
        })
        .unwrap();
        let f = sink.target();
        // Interior corner pixel of cell 0 (filled) vs cell 1 (empty).
        assert!(f.on(9, 21));
        assert!(!f.on(39, 21));
        // Focus frame sits two pixels outside cell 1.
        assert!(f.on(36, 18));
        assert!(!f.on(6, 18));
    }

    #[test]
    fn show_clears_previous_frame() {
        let mut sink = OledSink::new(Frame::new());
        sink.show(&View::SwitchGrid {
            title: "x",
            switches: &[true; 4],
            focused: 0,
        })
        .unwrap();
        sink.show(&View::Message("")).unwrap();
        assert!(sink.target().pixels.iter().all(|row| row.iter().all(|p| !p)));
    }

    #[test]
    fn peer_rows_show_marker_and_rssi() {
        let p = peer("ESPNOW-B", -71);
        assert_eq!(peer_row(&p, true).as_str(), "> ESPNOW-B [-71]");
        assert_eq!(peer_row(&p, false).as_str(), "  ESPNOW-B [-71]");
    }

    #[test]
    fn menu_rows_truncate_long_titles() {
        assert_eq!(menu_row("BLE Remote", true).as_str(), "> BLE Remote");
        assert_eq!(menu_row("Peer Remote", false).as_str(), "  Peer Remote");
        let long = menu_row("A very long session title", true);
        assert_eq!(long.as_str(), "> A very long sessio");
        assert_eq!(long.len(), ROW_CHARS);
    }

    #[test]
    fn list_window_follows_selection() {
        assert_eq!(first_visible_row(0, 3), 0);
        assert_eq!(first_visible_row(2, 3), 0);
        assert_eq!(first_visible_row(3, 3), 1);
        assert_eq!(first_visible_row(7, 3), 5);
    }
}
