//! Map presenter
//!
//! Holds the map widget's options, the single trajectory feature, the
//! markers drawn on top of it and the click-event channel. Tile drawing is
//! left to Leaflet in the browser; this type owns everything the page needs
//! to set it up and everything the page reports back.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::error::{MapError, MapResult};
use super::trajectory::Feature;

/// Latitude, longitude
pub type LatLng = [f64; 2];

/// Rectangular map extent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Leaflet's `[[lat, lon], [lat, lon]]` form
    pub fn as_pairs(&self) -> [LatLng; 2] {
        [self.south_west, self.north_east]
    }
}

/// What the map currently shows, reported with every click
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub zoom: u8,
    pub bounds: Bounds,
}

/// Events emitted by the presenter
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Clicked(Viewport),
}

/// Line style for the trajectory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            color: "#ff7800".to_string(),
            weight: 5,
            opacity: 0.85,
        }
    }
}

/// Initial widget setup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
    pub max_zoom: u8,
    /// Extent to fit on load, overriding center and zoom
    pub bbox: Option<Bounds>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: [41.505, -80.09],
            zoom: 3,
            max_zoom: 18,
            bbox: None,
        }
    }
}

/// A basemap offered in the layer switch
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
}

/// ESRI ocean basemap first (shown by default), world imagery second
pub fn default_basemaps() -> Vec<TileLayer> {
    vec![
        TileLayer {
            name: "ESRI OceansBaseMap".to_string(),
            url: "https://services.arcgisonline.com/ArcGIS/rest/services/Ocean_Basemap/MapServer/tile/{z}/{y}/{x}.jpg".to_string(),
            attribution: "Sources: Esri, GEBCO, NOAA, National Geographic, DeLorme, HERE, Geonames.org, and other contributors".to_string(),
            min_zoom: Some(1),
            max_zoom: Some(12),
        },
        TileLayer {
            name: "ESRI World Imagery".to_string(),
            url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
            attribution: "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community".to_string(),
            min_zoom: None,
            max_zoom: None,
        },
    ]
}

/// Request to draw a marker
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkerOptions {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub title: String,
    /// `stations` draws a circle icon, anything else a text marker
    pub category: Option<String>,
    pub highlighted: bool,
    pub selected: bool,
    pub hidden: bool,
    pub html: Option<String>,
}

/// Font Awesome marker icon
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkerIcon {
    pub prefix: String,
    pub icon: String,
    pub marker_color: String,
    pub html: String,
    pub class_name: String,
}

/// A marker ready to be placed on the map
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub icon: MarkerIcon,
    pub z_index_offset: i32,
    pub title: String,
    pub visible: bool,
}

const EVENT_CAPACITY: usize = 64;
const HIGHLIGHT_COLOR: &str = "red";
const NO_POPUP_CONTENT: &str = "No Popup Content";

/// Presenter for the trajectory map
pub struct MapPresenter {
    options: MapOptions,
    style: FeatureStyle,
    basemaps: Vec<TileLayer>,
    trajectory: Option<Feature>,
    highlighted: bool,
    markers: Vec<Marker>,
    events: broadcast::Sender<MapEvent>,
}

impl MapPresenter {
    pub fn new(options: MapOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            options,
            style: FeatureStyle::default(),
            basemaps: default_basemaps(),
            trajectory: None,
            highlighted: false,
            markers: Vec::new(),
            events,
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn basemaps(&self) -> &[TileLayer] {
        &self.basemaps
    }

    pub fn trajectory(&self) -> Option<&Feature> {
        self.trajectory.as_ref()
    }

    /// Markers added to the map, hidden ones excluded
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Hold `feature` as the trajectory, replacing any previous one
    ///
    /// A feature without popup text gets the placeholder text.
    pub fn add_trajectory(&mut self, feature: Feature) {
        let feature = if feature.popup_content().is_some() {
            feature
        } else {
            feature.with_popup_content(NO_POPUP_CONTENT)
        };
        self.trajectory = Some(feature);
        self.highlighted = false;
    }

    /// Style currently applied to the trajectory
    pub fn current_style(&self) -> FeatureStyle {
        if self.highlighted {
            FeatureStyle {
                color: HIGHLIGHT_COLOR.to_string(),
                ..self.style.clone()
            }
        } else {
            self.style.clone()
        }
    }

    /// The fixed trajectory style
    pub fn style(&self) -> &FeatureStyle {
        &self.style
    }

    /// Mouse-over; ignored while no trajectory is on the map
    pub fn highlight(&mut self) {
        if self.trajectory.is_some() {
            self.highlighted = true;
        }
    }

    /// Mouse-out
    pub fn reset_highlight(&mut self) {
        self.highlighted = false;
    }

    /// Subscribe to map events; dropping the receiver unsubscribes
    pub fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.events.subscribe()
    }

    /// Forward a click with the viewport at the time of the click
    ///
    /// Returns how many subscribers were notified.
    pub fn click(&self, viewport: Viewport) -> usize {
        match self.events.send(MapEvent::Clicked(viewport)) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!("Map click with no listeners");
                0
            }
        }
    }

    /// Build a marker and, unless hidden, add it to the map
    pub fn draw_marker(&mut self, options: MarkerOptions) -> MapResult<Marker> {
        let (lat, lon) = match (options.lat, options.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                tracing::error!(?options, "lat and lon are required options");
                return Err(MapError::MissingCoordinates);
            }
        };

        let emphasized = options.highlighted || options.selected;
        let marker_color = if emphasized { "red" } else { "darkblue" }.to_string();
        let icon = if options.category.as_deref() == Some("stations") {
            MarkerIcon {
                prefix: "fa".to_string(),
                icon: if emphasized { "fa-circle" } else { "fa-circle-o" }.to_string(),
                marker_color,
                html: String::new(),
                class_name: "awesome-marker".to_string(),
            }
        } else {
            MarkerIcon {
                prefix: "fa".to_string(),
                icon: " ".to_string(),
                marker_color,
                html: options.html.clone().unwrap_or_default(),
                class_name: "awesome-marker awesome-marker-text".to_string(),
            }
        };

        let marker = Marker {
            lat,
            lon,
            icon,
            z_index_offset: if emphasized { 1000 } else { 0 },
            title: options.title,
            visible: !options.hidden,
        };

        if marker.visible {
            // A titled marker replaces the one drawn earlier under that title
            if !marker.title.is_empty() {
                self.markers.retain(|m| m.title != marker.title);
            }
            self.markers.push(marker.clone());
        }
        Ok(marker)
    }

    /// Remove every marker, returning how many were on the map
    pub fn clear_markers(&mut self) -> usize {
        let removed = self.markers.len();
        self.markers.clear();
        removed
    }
}

impl Default for MapPresenter {
    fn default() -> Self {
        Self::new(MapOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::trajectory::Geometry;

    fn track() -> Feature {
        Feature::new(Geometry::LineString {
            coordinates: vec![vec![-65.0, 17.2], vec![-64.9, 17.3]],
        })
    }

    fn viewport() -> Viewport {
        Viewport {
            zoom: 9,
            bounds: Bounds::new([17.15, -65.05], [17.86, -63.95]),
        }
    }

    #[test]
    fn test_add_trajectory_sets_placeholder_popup() {
        let mut presenter = MapPresenter::default();
        presenter.add_trajectory(track());
        assert_eq!(
            presenter.trajectory().unwrap().popup_content(),
            Some("No Popup Content")
        );

        presenter.add_trajectory(track().with_popup_content("Glider ng292"));
        assert_eq!(
            presenter.trajectory().unwrap().popup_content(),
            Some("Glider ng292")
        );
    }

    #[test]
    fn test_highlight_and_reset() {
        let mut presenter = MapPresenter::default();
        presenter.highlight();
        assert_eq!(presenter.current_style().color, "#ff7800");

        presenter.add_trajectory(track());
        presenter.highlight();
        assert_eq!(presenter.current_style().color, "red");
        assert_eq!(presenter.current_style().weight, 5);

        presenter.reset_highlight();
        assert_eq!(presenter.current_style(), FeatureStyle::default());
    }

    #[tokio::test]
    async fn test_click_notifies_subscribers() {
        let presenter = MapPresenter::default();
        let mut first = presenter.subscribe();
        let mut second = presenter.subscribe();

        assert_eq!(presenter.click(viewport()), 2);
        assert_eq!(first.recv().await.unwrap(), MapEvent::Clicked(viewport()));
        assert_eq!(second.recv().await.unwrap(), MapEvent::Clicked(viewport()));

        drop(second);
        assert_eq!(presenter.click(viewport()), 1);
    }

    #[test]
    fn test_click_without_subscribers() {
        assert_eq!(MapPresenter::default().click(viewport()), 0);
    }

    #[test]
    fn test_draw_marker_requires_coordinates() {
        let mut presenter = MapPresenter::default();
        let err = presenter
            .draw_marker(MarkerOptions {
                lat: Some(17.5),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, MapError::MissingCoordinates));
        assert!(presenter.markers().is_empty());
    }

    #[test]
    fn test_station_marker_icons() {
        let mut presenter = MapPresenter::default();
        let plain = presenter
            .draw_marker(MarkerOptions {
                lat: Some(17.5),
                lon: Some(-64.5),
                category: Some("stations".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(plain.icon.icon, "fa-circle-o");
        assert_eq!(plain.icon.marker_color, "darkblue");
        assert_eq!(plain.z_index_offset, 0);

        let selected = presenter
            .draw_marker(MarkerOptions {
                lat: Some(17.5),
                lon: Some(-64.5),
                category: Some("stations".to_string()),
                selected: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(selected.icon.icon, "fa-circle");
        assert_eq!(selected.icon.marker_color, "red");
        assert_eq!(selected.z_index_offset, 1000);
        assert_eq!(presenter.markers().len(), 2);
    }

    #[test]
    fn test_titled_marker_replaces_previous() {
        let mut presenter = MapPresenter::default();
        let at = |lat: f64, title: &str| MarkerOptions {
            lat: Some(lat),
            lon: Some(-64.5),
            title: title.to_string(),
            ..Default::default()
        };

        presenter.draw_marker(at(17.5, "ru29")).unwrap();
        presenter.draw_marker(at(17.6, "ng292")).unwrap();
        presenter.draw_marker(at(17.7, "ru29")).unwrap();

        let markers = presenter.markers();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].title, "ng292");
        assert_eq!(markers[1].title, "ru29");
        assert_eq!(markers[1].lat, 17.7);

        // Untitled markers accumulate
        presenter.draw_marker(at(18.0, "")).unwrap();
        presenter.draw_marker(at(18.1, "")).unwrap();
        assert_eq!(presenter.markers().len(), 4);

        assert_eq!(presenter.clear_markers(), 4);
        assert!(presenter.markers().is_empty());
    }

    #[test]
    fn test_text_and_hidden_markers() {
        let mut presenter = MapPresenter::default();
        let marker = presenter
            .draw_marker(MarkerOptions {
                lat: Some(0.0),
                lon: Some(0.0),
                html: Some("42".to_string()),
                hidden: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(marker.icon.class_name, "awesome-marker awesome-marker-text");
        assert_eq!(marker.icon.html, "42");
        assert!(!marker.visible);
        assert!(presenter.markers().is_empty());
    }
}
