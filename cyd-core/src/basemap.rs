//! Static basemap registry for the map layer beneath data overlays.

/// A tile basemap available to the rendering layer.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Basemap {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub attribution: Option<&'static str>,
    pub max_zoom: Option<u8>,
}

/// All available basemaps. The first entry is the fallback for unknown ids.
pub const BASEMAPS: &[Basemap] = &[
    Basemap {
        id: "osm",
        name: "OpenStreetMap",
        url: "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: None,
        max_zoom: None,
    },
    Basemap {
        id: "satellite",
        name: "Satellite",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        attribution: None,
        max_zoom: None,
    },
    Basemap {
        id: "esri_worldterrain",
        name: "Esri WorldTerrain",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Terrain_Base/MapServer/tile/{z}/{y}/{x}",
        attribution: Some("Tiles © Esri — Source: USGS, Esri, TANA, DeLorme, and NPS"),
        max_zoom: Some(13),
    },
    Basemap {
        id: "esri_worldshadedrelief",
        name: "Esri WorldShadedRelief",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Shaded_Relief/MapServer/tile/{z}/{y}/{x}",
        attribution: Some("Tiles © Esri — Source: Esri"),
        max_zoom: Some(13),
    },
    Basemap {
        id: "esri_natgeoworldmap",
        name: "Esri NatGeoWorldMap",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/NatGeo_World_Map/MapServer/tile/{z}/{y}/{x}",
        attribution: Some("Tiles © Esri — National Geographic, Esri, DeLorme, NAVTEQ, UNEP-WCMC, USGS, NASA, ESA, METI, NRCAN, GEBCO, NOAA, iPC"),
        max_zoom: Some(16),
    },
    Basemap {
        id: "usgs_ustopo",
        name: "USGS USTopo",
        url: "https://basemap.nationalmap.gov/arcgis/rest/services/USGSTopo/MapServer/tile/{z}/{y}/{x}",
        attribution: Some("Tiles courtesy of the U.S. Geological Survey"),
        max_zoom: Some(20),
    },
];

/// Look up a basemap tile URL by id, defaulting to the first registry
/// entry when the id is unknown.
pub fn basemap_url(id: &str) -> &'static str {
    BASEMAPS
        .iter()
        .find(|b| b.id == id)
        .unwrap_or(&BASEMAPS[0])
        .url
}
