//! Writes `sample_listings.csv`: synthetic listings with the same columns
//! as the public NYC export, so the dashboard can run without it.

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (group, centre lat, centre lon, neighbourhoods, price multiplier)
const GROUPS: [(&str, f64, f64, [&str; 3], f64); 5] = [
    ("Manhattan", 40.7831, -73.9712, ["Midtown", "Harlem", "East Village"], 1.6),
    ("Brooklyn", 40.6782, -73.9442, ["Williamsburg", "Bushwick", "Park Slope"], 1.1),
    ("Queens", 40.7282, -73.7949, ["Astoria", "Flushing", "Jamaica"], 0.85),
    ("Bronx", 40.8448, -73.8648, ["Fordham", "Mott Haven", "Riverdale"], 0.7),
    ("Staten Island", 40.5795, -74.1502, ["St. George", "Tottenville", "Arrochar"], 0.75),
];

/// (room type, base price, share out of 100)
const ROOM_TYPES: [(&str, f64, usize); 3] = [
    ("Entire home/apt", 180.0, 52),
    ("Private room", 80.0, 45),
    ("Shared room", 60.0, 3),
];

const HOSTS: [&str; 6] = ["John", "Maria", "David", "Sonder", "Kevin", "Alex"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_listings.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;

    writer.write_record([
        "id",
        "name",
        "host_id",
        "host_name",
        "neighbourhood_group",
        "neighbourhood",
        "latitude",
        "longitude",
        "room_type",
        "price",
        "minimum_nights",
        "number_of_reviews",
        "last_review",
        "reviews_per_month",
        "calculated_host_listings_count",
        "availability_365",
    ])?;

    let rows = 5000;
    for id in 0..rows {
        let (group, lat, lon, hoods, multiplier) = GROUPS[rng.below(GROUPS.len())];
        let hood = hoods[rng.below(hoods.len())];

        let mut pick = rng.below(100);
        let (room_type, base_price, _) = *ROOM_TYPES
            .iter()
            .find(|(_, _, share)| {
                if pick < *share {
                    true
                } else {
                    pick -= share;
                    false
                }
            })
            .unwrap_or(&ROOM_TYPES[0]);

        // Log-normal-ish prices, with a few free listings and luxury outliers.
        let price = match rng.below(400) {
            0 => 0,
            1 => 1500 + rng.below(8500),
            _ => (base_price * multiplier * rng.gauss(0.0, 0.45).exp()).round().max(10.0) as usize,
        };
        let reviews = (rng.gauss(0.0, 1.4).exp() * 8.0) as u64;
        let host = rng.below(HOSTS.len());
        let (last_review, per_month) = if reviews == 0 {
            (String::new(), String::new())
        } else {
            (
                format!("2019-{:02}-{:02}", 1 + rng.below(7), 1 + rng.below(28)),
                format!("{:.2}", reviews as f64 / (1.0 + rng.below(60) as f64)),
            )
        };

        writer.write_record([
            (1000 + id).to_string(),
            format!("{room_type} in {hood}"),
            (host + 1).to_string(),
            HOSTS[host].to_string(),
            group.to_string(),
            hood.to_string(),
            format!("{:.5}", lat + rng.gauss(0.0, 0.02)),
            format!("{:.5}", lon + rng.gauss(0.0, 0.02)),
            room_type.to_string(),
            price.to_string(),
            (1 + rng.below(30)).to_string(),
            reviews.to_string(),
            last_review,
            per_month,
            (1 + rng.below(5)).to_string(),
            rng.below(366).to_string(),
        ])?;
    }
    writer.flush().context("flushing output file")?;

    println!("Wrote {rows} listings to {output_path}");
    Ok(())
}
