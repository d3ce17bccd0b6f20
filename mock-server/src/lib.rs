use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

// Every endpoint is a GET with path-segment parameters and answers 200 with
// a JSON array: empty on a successful write, conflict rows on duplicates or
// unknown references, single flag rows (`passed`, `id`, `enviado`) for the
// confirm endpoints. Row fields carry the backend's Spanish names.

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestaurantRow {
    pub id: i64,
    pub nombre: String,
    pub latitud: f64,
    pub longitud: f64,
    pub contacto: String,
    pub horario: String,
    pub precio: u8,
    pub calificacion: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentRow {
    pub nombre: String,
    pub comentario: String,
}

#[derive(Clone, Debug, PartialEq)]
enum Credential {
    Password(String),
    SocialId(i64),
}

#[derive(Clone, Debug)]
struct User {
    id: i64,
    name: String,
    credential: Credential,
}

#[derive(Clone, Debug)]
struct StoredRestaurant {
    id: i64,
    nombre: String,
    latitud: f64,
    longitud: f64,
    contacto: String,
    horario: String,
    precio: u8,
}

#[derive(Clone, Debug)]
struct StoredComment {
    restaurant_id: i64,
    user_id: i64,
    texto: String,
}

#[derive(Default, Debug)]
pub struct Directory {
    next_user_id: i64,
    next_restaurant_id: i64,
    users: HashMap<String, User>,
    restaurants: Vec<StoredRestaurant>,
    comments: Vec<StoredComment>,
    ratings: HashMap<(i64, i64), u8>,
}

impl Directory {
    fn register(&mut self, name: String, email: String, credential: Credential) -> bool {
        if self.users.contains_key(&email) {
            return false;
        }
        self.next_user_id += 1;
        let user = User {
            id: self.next_user_id,
            name,
            credential,
        };
        self.users.insert(email, user);
        true
    }

    fn user_exists(&self, id: i64) -> bool {
        self.users.values().any(|u| u.id == id)
    }

    fn user_name(&self, id: i64) -> String {
        self.users
            .values()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    }

    fn restaurant_exists(&self, id: i64) -> bool {
        self.restaurants.iter().any(|r| r.id == id)
    }

    /// Mean of the stars posted for a restaurant, rounded to the nearest
    /// integer; 0 while unrated.
    fn aggregate_rating(&self, restaurant_id: i64) -> i64 {
        let stars: Vec<i64> = self
            .ratings
            .iter()
            .filter(|((rated, _), _)| *rated == restaurant_id)
            .map(|(_, stars)| i64::from(*stars))
            .collect();
        if stars.is_empty() {
            return 0;
        }
        let mean = stars.iter().sum::<i64>() as f64 / stars.len() as f64;
        mean.round() as i64
    }

    fn row(&self, restaurant: &StoredRestaurant) -> RestaurantRow {
        RestaurantRow {
            id: restaurant.id,
            nombre: restaurant.nombre.clone(),
            latitud: restaurant.latitud,
            longitud: restaurant.longitud,
            contacto: restaurant.contacto.clone(),
            horario: restaurant.horario.clone(),
            precio: restaurant.precio,
            calificacion: self.aggregate_rating(restaurant.id),
        }
    }
}

pub type Db = Arc<RwLock<Directory>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Directory::default()));
    Router::new()
        .route("/newUser/{name}/{email}/{password}", get(register_user))
        .route(
            "/newFaceUser/{name}/{email}/{social_id}",
            get(register_social_user),
        )
        .route("/user/{email}/{password}", get(authenticate_user))
        .route("/facebookuser/{email}/{social_id}", get(authenticate_social_user))
        .route("/rests/{radius_km}/{lat}/{lon}", get(nearby_restaurants))
        .route(
            "/newrest/{name}/{lat}/{lon}/{contact}/{hours}/{price}",
            get(create_restaurant),
        )
        .route("/userid/{email}", get(user_id))
        .route("/comment/{restaurant_id}/{user_id}/{text}", get(post_comment))
        .route("/califica/{restaurant_id}/{user_id}/{stars}", get(post_rating))
        .route("/comments/{restaurant_id}", get(list_comments))
        .route("/recover/{email}", get(recover_password))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn accepted() -> Json<Value> {
    Json(json!([]))
}

fn conflict(reason: &str) -> Json<Value> {
    Json(json!([{ "error": reason }]))
}

async fn register_user(
    State(db): State<Db>,
    Path((name, email, password)): Path<(String, String, String)>,
) -> Json<Value> {
    let mut dir = db.write().await;
    if dir.register(name, email, Credential::Password(password)) {
        accepted()
    } else {
        conflict("email already registered")
    }
}

async fn register_social_user(
    State(db): State<Db>,
    Path((name, email, social_id)): Path<(String, String, i64)>,
) -> Json<Value> {
    let mut dir = db.write().await;
    if dir.register(name, email, Credential::SocialId(social_id)) {
        accepted()
    } else {
        conflict("email already registered")
    }
}

async fn authenticate_user(
    State(db): State<Db>,
    Path((email, password)): Path<(String, String)>,
) -> Json<Value> {
    let dir = db.read().await;
    match dir.users.get(&email) {
        None => Json(json!([])),
        Some(user) => {
            let passed = user.credential == Credential::Password(password);
            Json(json!([{ "passed": passed }]))
        }
    }
}

async fn authenticate_social_user(
    State(db): State<Db>,
    Path((email, social_id)): Path<(String, i64)>,
) -> Json<Value> {
    let dir = db.read().await;
    match dir.users.get(&email) {
        None => Json(json!([])),
        Some(user) => {
            let passed = user.credential == Credential::SocialId(social_id);
            Json(json!([{ "passed": passed }]))
        }
    }
}

async fn nearby_restaurants(
    State(db): State<Db>,
    Path((radius_km, lat, lon)): Path<(f64, f64, f64)>,
) -> Json<Vec<RestaurantRow>> {
    let dir = db.read().await;
    let rows = dir
        .restaurants
        .iter()
        .filter(|r| distance_km(lat, lon, r.latitud, r.longitud) <= radius_km)
        .map(|r| dir.row(r))
        .collect();
    Json(rows)
}

async fn create_restaurant(
    State(db): State<Db>,
    Path((name, lat, lon, contact, hours, price)): Path<(String, f64, f64, String, String, u8)>,
) -> Json<Value> {
    let mut dir = db.write().await;
    if dir.restaurants.iter().any(|r| r.nombre == name) {
        return conflict("restaurant already exists");
    }
    dir.next_restaurant_id += 1;
    let id = dir.next_restaurant_id;
    dir.restaurants.push(StoredRestaurant {
        id,
        nombre: name,
        latitud: lat,
        longitud: lon,
        contacto: contact,
        horario: hours,
        precio: price,
    });
    accepted()
}

async fn user_id(State(db): State<Db>, Path(email): Path<String>) -> Json<Value> {
    let dir = db.read().await;
    match dir.users.get(&email) {
        Some(user) => Json(json!([{ "id": user.id }])),
        None => Json(json!([])),
    }
}

async fn post_comment(
    State(db): State<Db>,
    Path((restaurant_id, user_id, text)): Path<(i64, i64, String)>,
) -> Json<Value> {
    let mut dir = db.write().await;
    if !dir.restaurant_exists(restaurant_id) {
        return conflict("unknown restaurant");
    }
    if !dir.user_exists(user_id) {
        return conflict("unknown user");
    }
    dir.comments.push(StoredComment {
        restaurant_id,
        user_id,
        texto: text,
    });
    accepted()
}

async fn post_rating(
    State(db): State<Db>,
    Path((restaurant_id, user_id, stars)): Path<(i64, i64, u8)>,
) -> Json<Value> {
    let mut dir = db.write().await;
    if !dir.restaurant_exists(restaurant_id) {
        return conflict("unknown restaurant");
    }
    if !dir.user_exists(user_id) {
        return conflict("unknown user");
    }
    if !(1..=5).contains(&stars) {
        return conflict("stars out of range");
    }
    dir.ratings.insert((restaurant_id, user_id), stars);
    accepted()
}

async fn list_comments(
    State(db): State<Db>,
    Path(restaurant_id): Path<i64>,
) -> Json<Vec<CommentRow>> {
    let dir = db.read().await;
    let rows = dir
        .comments
        .iter()
        .filter(|c| c.restaurant_id == restaurant_id)
        .map(|c| CommentRow {
            nombre: dir.user_name(c.user_id),
            comentario: c.texto.clone(),
        })
        .collect();
    Json(rows)
}

async fn recover_password(State(db): State<Db>, Path(email): Path<String>) -> Json<Value> {
    let dir = db.read().await;
    if dir.users.contains_key(&email) {
        Json(json!([{ "enviado": true }]))
    } else {
        Json(json!([]))
    }
}

/// Great-circle distance between two coordinates, in kilometers.
fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}
