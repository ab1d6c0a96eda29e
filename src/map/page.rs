//! Leaflet page for the trajectory map

use serde_json::json;

use super::presenter::MapPresenter;

/// Where the page fetches the trajectory feature from
pub const TRAJECTORY_PATH: &str = "/static/json/trajectories.json";

/// Where the page reports clicks
pub const CLICK_PATH: &str = "/api/map/click";

/// Render the map document for the presenter's current setup
pub fn render_map_page(presenter: &MapPresenter, title: &str) -> String {
    let options = presenter.options();
    let setup = json!({
        "center": options.center,
        "zoom": options.zoom,
        "maxZoom": options.max_zoom,
        "bbox": options.bbox.map(|b| b.as_pairs()),
        "style": presenter.style(),
        "basemaps": presenter.basemaps(),
        "markers": presenter.markers(),
        "trajectoryUrl": TRAJECTORY_PATH,
        "clickUrl": CLICK_PATH,
    });

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css">
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
    <style>
        html, body {{ height: 100%; margin: 0; padding: 0; }}
        #map-view {{ height: 100%; width: 100%; }}
    </style>
</head>
<body>
    <div id="map-view"></div>
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script>
    const SETUP = {setup};
    const map = L.map('map-view', {{ center: SETUP.center, zoom: SETUP.zoom, maxZoom: SETUP.maxZoom }});
    if (SETUP.bbox) {{ map.fitBounds(SETUP.bbox); }}

    const layers = {{}};
    SETUP.basemaps.forEach(function (b, i) {{
        const opts = {{ attribution: b.attribution }};
        if (b.min_zoom !== undefined) {{ opts.minZoom = b.min_zoom; }}
        if (b.max_zoom !== undefined) {{ opts.maxZoom = b.max_zoom; }}
        layers[b.name] = L.tileLayer(b.url, opts);
        if (i === 0) {{ layers[b.name].addTo(map); }}
    }});
    L.control.layers(layers).addTo(map);

    SETUP.markers.forEach(function (m) {{
        const i = m.icon;
        const icon = L.divIcon({{
            className: i.class_name + ' awesome-marker-icon-' + i.marker_color,
            html: i.html || '<i class="' + i.prefix + ' ' + i.icon + '"></i>',
            iconSize: [35, 45],
            iconAnchor: [17, 42]
        }});
        L.marker([m.lat, m.lon], {{ icon: icon, title: m.title, zIndexOffset: m.z_index_offset }}).addTo(map);
    }});

    fetch(SETUP.trajectoryUrl)
        .then(function (r) {{ return r.ok ? r.json() : null; }})
        .then(function (feature) {{
            if (!feature) {{ return; }}
            L.geoJson(feature, {{
                style: SETUP.style,
                onEachFeature: function (f, layer) {{
                    layer.bindPopup((f.properties && f.properties.popupContent) || 'No Popup Content');
                    layer.on({{
                        mouseover: function () {{ layer.setStyle({{ color: 'red' }}); }},
                        mouseout: function () {{ layer.setStyle(SETUP.style); }}
                    }});
                }}
            }}).addTo(map);
        }})
        .catch(function () {{}});

    map.on('click', function () {{
        const b = map.getBounds();
        fetch(SETUP.clickUrl, {{
            method: 'POST',
            headers: {{ 'Content-Type': 'application/json' }},
            body: JSON.stringify({{
                zoom: map.getZoom(),
                bounds: {{
                    south_west: [b.getSouth(), b.getWest()],
                    north_east: [b.getNorth(), b.getEast()]
                }}
            }})
        }});
    }});
    </script>
</body>
</html>"#,
        title = crate::dashboard::render::html_escape(title),
        setup = script_json(&setup.to_string()),
    )
}

/// Keep embedded JSON from closing the surrounding script element
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
