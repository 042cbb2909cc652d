use iced::{
    mouse,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, LineDash, Path, Stroke},
        column, container, mouse_area, row, scrollable, text, Column, Container, Row,
    },
    window, Alignment, Color, Element, Length, Padding, Pixels, Point, Rectangle, Renderer, Size,
    Subscription, Task, Theme,
};
use spectracore::dataset::DeviceId;
use spectracore::i18n::{DEFAULT_LANGUAGE, LANGUAGES};
use spectracore::interaction::{placement, Popup, PopupPlacement, ViewEvents};
use spectracore::layout::{MapScene, MapSurface, SpectrumScene, TextAnchor, TextLabel, WebMercatorView};
use spectracore::math::Rgb;
use spectracore::prelude::{LatLng, Point as ScenePoint};
use spectracore::{LayoutConfig, LoadOutcome, LoadTicket, Session};

const MAP_WIDTH: f32 = 640.0;
const MAP_HEIGHT: f32 = 520.0;
const LABEL_SIZE: f32 = 13.0;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Visualizer) -> String {
    format!("Spectrum Map ({})", state.session.language())
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    window::resize_events().map(|(_id, size)| Message::WindowResized(size))
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Light
}

fn base_url() -> String {
    std::env::var("SPECTRAMAP_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:9000".into())
        .trim_end_matches('/')
        .to_string()
}

fn to_color(rgb: Rgb, alpha: f64) -> Color {
    let [r, g, b] = rgb.to_unit();
    Color::from_rgba(r, g, b, alpha as f32)
}

struct Visualizer {
    base_url: String,
    session: Session,
    map_view: WebMercatorView,
    window_width: f32,
    spectrum_cursor: Option<ScenePoint>,
    map_cursor: Option<ScenePoint>,
    tooltip: Option<String>,
    popup: Option<Popup>,
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    LanguageSelected(&'static str),
    LocalizationFetched(LoadTicket, Result<String, String>),
    DatasetFetched(LoadTicket, Result<String, String>),
    SpectrumMoved(Point),
    MapMoved(Point),
    PointerLeft,
    SpectrumPressed,
    MapPressed,
    ClosePopup,
    WindowResized(Size),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let language =
            std::env::var("SPECTRAMAP_LANG").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());
        let mut state = Visualizer {
            base_url: base_url(),
            session: Session::new(LayoutConfig::default(), language.clone()),
            map_view: WebMercatorView::default().resized(MAP_WIDTH as f64, MAP_HEIGHT as f64),
            window_width: 1280.0,
            spectrum_cursor: None,
            map_cursor: None,
            tooltip: None,
            popup: None,
            status: "Loading...".into(),
        };
        let task = state.load_language(language);
        (state, task)
    }

    /// Localization first, then the dataset; the same sequence runs on every
    /// language switch.
    fn load_language(&mut self, language: String) -> Task<Message> {
        let url = format!("{}/i18n/{}.json", self.base_url, language);
        let ticket = self.session.request_language(language);
        Task::perform(fetch_text(url), move |result| {
            Message::LocalizationFetched(ticket.clone(), result)
        })
    }

    fn load_dataset(&mut self) -> Task<Message> {
        let url = format!("{}/data.json", self.base_url);
        let ticket = self.session.request_dataset();
        Task::perform(fetch_text(url), move |result| {
            Message::DatasetFetched(ticket.clone(), result)
        })
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::LanguageSelected(code) => {
                state.status = format!("Switching to {code}...");
                state.load_language(code.to_string())
            }
            Message::LocalizationFetched(ticket, result) => {
                match state.session.complete_language(&ticket, result) {
                    LoadOutcome::Stale => Task::none(),
                    outcome => {
                        match outcome {
                            LoadOutcome::Failed => {
                                state.status =
                                    format!("Localization for {} unavailable", ticket.language);
                            }
                            _ => state.refresh_popup(),
                        }
                        state.load_dataset()
                    }
                }
            }
            Message::DatasetFetched(ticket, result) => {
                match state.session.complete_dataset(&ticket, result) {
                    LoadOutcome::Applied => {
                        state.refresh_popup();
                        state.tooltip = None;
                        state.status = state.summary();
                    }
                    LoadOutcome::Failed => {
                        state.status = state
                            .session
                            .catalog()
                            .text(spectracore::i18n::CatalogKey::DataLoadError)
                            .to_string();
                    }
                    LoadOutcome::Stale => {}
                }
                Task::none()
            }
            Message::SpectrumMoved(position) => {
                let point = ScenePoint::new(position.x as f64, position.y as f64);
                state.spectrum_cursor = Some(point);
                let hit = state.session.view().and_then(|view| {
                    view.scene()
                        .spectrum
                        .band_at(point)
                        .map(|band| (band.id.clone(), band.tooltip.clone()))
                });
                state.tooltip = hit.as_ref().map(|(_, tooltip)| tooltip.clone());
                state.hover(hit.map(|(id, _)| id));
                Task::none()
            }
            Message::MapMoved(position) => {
                let point = ScenePoint::new(position.x as f64, position.y as f64);
                state.map_cursor = Some(point);
                let surface = state.map_view;
                let hit = state.session.view().and_then(|view| {
                    view.scene()
                        .map
                        .marker_at(&surface, point)
                        .map(|marker| marker.id.clone())
                });
                state.tooltip = None;
                state.hover(hit);
                Task::none()
            }
            Message::PointerLeft => {
                state.spectrum_cursor = None;
                state.map_cursor = None;
                state.tooltip = None;
                state.hover(None);
                Task::none()
            }
            Message::SpectrumPressed => {
                let target = state.spectrum_cursor.and_then(|point| {
                    state
                        .session
                        .view()
                        .and_then(|view| view.scene().spectrum.band_at(point))
                        .map(|band| band.id.clone())
                });
                state.open_popup(target);
                Task::none()
            }
            Message::MapPressed => {
                let surface = state.map_view;
                let target = state.map_cursor.and_then(|point| {
                    state
                        .session
                        .view()
                        .and_then(|view| view.scene().map.marker_at(&surface, point))
                        .map(|marker| marker.id.clone())
                });
                state.open_popup(target);
                Task::none()
            }
            Message::ClosePopup => {
                state.popup = None;
                if let Some(view) = state.session.view_mut() {
                    view.reset();
                }
                Task::none()
            }
            Message::WindowResized(size) => {
                state.window_width = size.width;
                Task::none()
            }
        }
    }

    /// Moves the highlight to whatever is under the pointer. Staying over the
    /// same device is not a new hover.
    fn hover(&mut self, target: Option<DeviceId>) {
        let Some(view) = self.session.view_mut() else {
            return;
        };
        match target {
            Some(id) if view.highlighted() != Some(&id) => view.on_hover(&id),
            Some(_) => {}
            None if view.highlighted().is_some() => view.on_leave(),
            None => {}
        }
    }

    /// Re-renders an open popup after a rebuild. It only closes when its
    /// device is no longer in the data.
    fn refresh_popup(&mut self) {
        self.popup = self
            .popup
            .take()
            .and_then(|popup| self.session.refresh_popup(&popup));
    }

    fn open_popup(&mut self, target: Option<DeviceId>) {
        let Some(id) = target else {
            return;
        };
        if let Some(view) = self.session.view_mut() {
            self.popup = view.on_click(&id);
        }
    }

    fn summary(&self) -> String {
        let Some(view) = self.session.view() else {
            return "No data".into();
        };
        let scene = view.scene();
        let metadata = &scene.dataset().metadata;
        let members = if metadata.members.is_empty() {
            "n/a".to_string()
        } else {
            metadata
                .members
                .iter()
                .map(|(name, role)| format!("{name} ({role})"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{} devices, {} bands | members: {} | updated {}",
            scene.dataset().devices.len(),
            scene.spectrum.bands.len(),
            members,
            metadata.last_updated.as_deref().unwrap_or("n/a")
        )
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let languages = LANGUAGES.iter().fold(Row::new().spacing(8), |row, language| {
            let label = button(text(language.name).size(14)).padding(6);
            let label = if language.code == state.session.language() {
                label
            } else {
                label.on_press(Message::LanguageSelected(language.code))
            };
            row.push(label)
        });

        let header = row![
            text("Spectrum Map").size(26),
            languages,
            text(&state.status).size(14),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let (spectrum, map) = match state.session.view() {
            Some(view) => (
                Some(view.scene().spectrum.clone()),
                Some(view.scene().map.clone()),
            ),
            None => (None, None),
        };
        let layout = state.session.layout();

        let spectrum_canvas = mouse_area(
            Canvas::new(SpectrumChart { scene: spectrum })
                .width(Length::Fixed(layout.width as f32))
                .height(Length::Fixed(layout.height as f32)),
        )
        .on_move(Message::SpectrumMoved)
        .on_exit(Message::PointerLeft)
        .on_press(Message::SpectrumPressed);

        let map_canvas = mouse_area(
            Canvas::new(DeviceMap {
                scene: map,
                surface: state.map_view,
            })
            .width(Length::Fixed(MAP_WIDTH))
            .height(Length::Fixed(MAP_HEIGHT)),
        )
        .on_move(Message::MapMoved)
        .on_exit(Message::PointerLeft)
        .on_press(Message::MapPressed);

        let tooltip = text(state.tooltip.clone().unwrap_or_default()).size(13);
        let spectrum_column = column![spectrum_canvas, tooltip]
            .spacing(6)
            .width(Length::Fixed(layout.width as f32));

        let popup_placement = state.popup.as_ref().map(|popup| {
            let anchor = state.map_view.project(popup.anchor);
            (popup, placement(state.window_width as f64, anchor))
        });

        let mut views = row![spectrum_column, map_canvas].spacing(20);
        if let Some((popup, PopupPlacement::Anchored(anchor))) = popup_placement {
            let offset = (anchor.y as f32 - 20.0).clamp(0.0, MAP_HEIGHT);
            views = views.push(container(popup_card(popup)).padding(Padding {
                top: offset,
                right: 0.0,
                bottom: 0.0,
                left: 0.0,
            }));
        }

        let mut page = column![header, views].spacing(16).padding(20);
        if let Some((popup, PopupPlacement::Docked)) = popup_placement {
            page = page.push(container(popup_card(popup)).width(Length::Fill));
        }

        Container::new(scrollable(page))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn popup_card(popup: &Popup) -> Element<'_, Message> {
    let content = &popup.content;
    let mut body = Column::new()
        .spacing(6)
        .padding(12)
        .width(Length::Fixed(300.0))
        .push(text(&content.nickname).size(18))
        .push(text(&content.location).size(13))
        .push(text(&content.en_location).size(13))
        .push(text(format!("{} / {}", content.keychip, content.main)).size(12))
        .push(text(content.type_line()).size(14));

    if let Some(description) = &content.description {
        body = body.push(text(description).size(13));
    }
    if let Some(evidences) = &content.evidences {
        body = body.push(text(&content.evidence_heading).size(14));
        body = evidences
            .iter()
            .fold(body, |body, item| body.push(text(format!("• {item}")).size(12)));
    }
    if let Some(video) = &content.video {
        body = body.push(text(format!("{}: {}", video.label, video.url)).size(12));
    }
    body = body.push(button(text("×").size(14)).on_press(Message::ClosePopup));

    container(body).style(container::rounded_box).into()
}

async fn fetch_text(url: String) -> Result<String, String> {
    let response = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    let response = response.error_for_status().map_err(|e| e.to_string())?;
    response.text().await.map_err(|e| e.to_string())
}

fn draw_label(frame: &mut Frame, label: &TextLabel, color: Color) {
    let align_x = match label.anchor {
        TextAnchor::Start => Alignment::Start,
        TextAnchor::Middle => Alignment::Center,
        TextAnchor::End => Alignment::End,
    };
    frame.fill_text(canvas::Text {
        content: label.text.clone(),
        position: Point::new(label.position.x as f32, label.position.y as f32),
        color,
        size: Pixels(LABEL_SIZE),
        align_x: align_x.into(),
        align_y: Alignment::Center.into(),
        ..canvas::Text::default()
    });
}

struct SpectrumChart {
    scene: Option<SpectrumScene>,
}

impl canvas::Program<Message> for SpectrumChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        let Some(scene) = &self.scene else {
            return vec![frame.into_geometry()];
        };

        // gradient drawn as one-pixel slices, top is the high end of the scale
        let bar = &scene.bar;
        let rows = bar.rect.height.max(1.0) as usize;
        for step in 0..rows {
            let fraction = 1.0 - step as f64 / rows as f64;
            frame.fill_rectangle(
                Point::new(bar.rect.x as f32, (bar.rect.y + step as f64) as f32),
                Size::new(bar.rect.width as f32, 1.0),
                to_color(bar.color_at(fraction), bar.opacity),
            );
        }
        frame.stroke(
            &Path::rectangle(
                Point::new(bar.rect.x as f32, bar.rect.y as f32),
                Size::new(bar.rect.width as f32, bar.rect.height as f32),
            ),
            Stroke::default()
                .with_width(bar.stroke_width as f32)
                .with_color(to_color(bar.stroke, 1.0)),
        );

        let label_color = Color::from_rgb8(0x55, 0x55, 0x55);
        for label in &scene.range_labels {
            draw_label(&mut frame, label, label_color);
        }
        draw_label(&mut frame, &scene.top_caption, Color::BLACK);
        draw_label(&mut frame, &scene.bottom_caption, Color::BLACK);

        for band in &scene.bands {
            let style = &band.style;
            let rect = Path::rectangle(
                Point::new(band.rect.x as f32, band.rect.y as f32),
                Size::new(band.rect.width as f32, band.rect.height as f32),
            );
            frame.fill(&rect, to_color(band.fill, style.opacity));
            if let Some(stroke) = style.stroke {
                let segments = style.dash.map(|[dash, gap]| [dash as f32, gap as f32]);
                let line_dash = LineDash {
                    segments: segments.as_ref().map_or(&[][..], |pair| &pair[..]),
                    offset: 0,
                };
                frame.stroke(
                    &rect,
                    Stroke {
                        line_dash,
                        ..Stroke::default()
                            .with_width(style.stroke_width as f32)
                            .with_color(to_color(stroke, style.opacity))
                    },
                );
            }
        }

        vec![frame.into_geometry()]
    }
}

struct DeviceMap {
    scene: Option<MapScene>,
    surface: WebMercatorView,
}

impl DeviceMap {
    fn draw_graticule(&self, frame: &mut Frame, bounds: Rectangle) {
        let line = || {
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.82, 0.86, 0.9))
        };
        let center = self.surface.center;
        for step in -6..=6 {
            let offset = step as f64 * 0.5;
            let lat = self.surface.project(LatLng::new(center.lat.round() + offset, center.lng));
            let lng = self.surface.project(LatLng::new(center.lat, center.lng.round() + offset));
            let horizontal = Path::line(
                Point::new(0.0, lat.y as f32),
                Point::new(bounds.width, lat.y as f32),
            );
            let vertical = Path::line(
                Point::new(lng.x as f32, 0.0),
                Point::new(lng.x as f32, bounds.height),
            );
            frame.stroke(&horizontal, line());
            frame.stroke(&vertical, line());
        }
    }
}

impl canvas::Program<Message> for DeviceMap {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.93, 0.95, 0.97),
        );
        self.draw_graticule(&mut frame, bounds);

        let Some(scene) = &self.scene else {
            return vec![frame.into_geometry()];
        };

        for marker in scene.draw_order() {
            let center = self.surface.project(marker.position);
            let style = &marker.style;
            let circle = Path::circle(
                Point::new(center.x as f32, center.y as f32),
                style.radius as f32,
            );
            frame.fill(&circle, to_color(marker.fill, style.fill_opacity));
            frame.stroke(
                &circle,
                Stroke::default()
                    .with_width(style.weight as f32)
                    .with_color(to_color(style.border, style.opacity)),
            );
        }

        vec![frame.into_geometry()]
    }
}
