use maud::{html, Markup};

/// Landing page greeting with the literal route list
pub fn home_page() -> Markup {
    html! {
        "Welcome to the Climate API!"
        br;
        "Available Routes:"
        br;
        "/api/v1.0/precipitation"
        br;
        "/api/v1.0/stations"
        br;
        "/api/v1.0/tobs"
        br;
        "/api/v1.0/<start>"
        br;
        "/api/v1.0/<start>/<end>"
        br;
    }
}
