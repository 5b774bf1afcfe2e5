//! Demo catalog seeding
//!
//! Inserts the storefront's starter products. Slugs that already exist are
//! left untouched, so seeding twice is harmless.

use sqlx::PgPool;

use crate::db::repos::{DbError, ProductRepo};
use crate::models::{NewProduct, Slug, ValidationError};

struct SeedProduct {
    slug: &'static str,
    title: &'static str,
    description_short: &'static str,
    description_full: &'static str,
    price_idr: i64,
    category: &'static str,
    badges: &'static [&'static str],
    image: &'static str,
    is_active: bool,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        slug: "smart-trend-indicator",
        title: "Smart Trend Indicator",
        description_short: "Indikator yang membantu mengidentifikasi tren pasar dengan mudah. \
            Cocok untuk pemula yang baru belajar analisis teknikal.",
        description_full: "Indikator trading dengan tampilan visual sederhana untuk membaca arah tren.\n\n\
            Fitur utama:\n- Deteksi tren otomatis (bullish/bearish)\n- Sinyal entry dan exit yang jelas\n\
            - Kompatibel dengan MT4 dan MT5\n- Alert notifikasi ke HP",
        price_idr: 299_000,
        category: "indikator",
        badges: &["popular"],
        image: "https://images.unsplash.com/photo-1611974789855-9c2a0a7236a3?w=800&auto=format&fit=crop&q=60",
        is_active: true,
    },
    SeedProduct {
        slug: "auto-scalper-ea",
        title: "Auto Scalper EA",
        description_short: "Robot trading otomatis untuk strategi scalping. Dilengkapi dengan \
            manajemen risiko bawaan dan mudah dikonfigurasi.",
        description_full: "Expert Advisor dengan strategi scalping otomatis.\n\n\
            Fitur utama:\n- Trading otomatis 24/5\n- Stop loss dan take profit bawaan\n\
            - Parameter mudah dikonfigurasi\n\nDisclaimer: Robot ini TIDAK menjamin profit.",
        price_idr: 499_000,
        category: "robot",
        badges: &["new"],
        image: "https://images.unsplash.com/photo-1518186285589-2f7649de83e0?w=800&auto=format&fit=crop&q=60",
        is_active: true,
    },
    SeedProduct {
        slug: "panduan-trading-pemula",
        title: "Panduan Trading Pemula",
        description_short: "Ebook lengkap untuk memulai trading dari nol. Bahasa sederhana, \
            banyak ilustrasi, dan contoh praktis.",
        description_full: "Panduan lengkap untuk trader baru.\n\n\
            Isi ebook:\n- Pengenalan pasar forex\n- Cara membaca chart\n- Analisis teknikal dasar\n\
            - Manajemen risiko\n\nFormat: PDF (150+ halaman)",
        price_idr: 99_000,
        category: "ebook",
        badges: &["bestseller"],
        image: "https://images.unsplash.com/photo-1544716278-ca5e3f4abd8c?w=800&auto=format&fit=crop&q=60",
        is_active: true,
    },
    SeedProduct {
        slug: "fxsociety-tshirt",
        title: "FXSociety T-Shirt",
        description_short: "Kaos premium dengan desain eksklusif fxsociety. Bahan cotton combed \
            30s yang nyaman dipakai.",
        description_full: "Spesifikasi:\n- Bahan: Cotton Combed 30s\n- Sablon: DTF Premium\n\
            - Ukuran: S, M, L, XL, XXL\n- Warna: Hitam",
        price_idr: 150_000,
        category: "merchandise",
        badges: &[],
        image: "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=800&auto=format&fit=crop&q=60",
        is_active: true,
    },
    SeedProduct {
        slug: "support-resistance-pro",
        title: "Support & Resistance Pro",
        description_short: "Indikator otomatis yang menggambar level support dan resistance \
            penting. Hemat waktu analisis Anda.",
        description_full: "Fitur:\n- Deteksi level otomatis\n- Multi-timeframe analysis\n\
            - Alert saat harga mendekati level\n- Kompatibel MT4/MT5",
        price_idr: 349_000,
        category: "indikator",
        badges: &[],
        image: "https://images.unsplash.com/photo-1642790106117-e829e14a795f?w=800&auto=format&fit=crop&q=60",
        is_active: true,
    },
    SeedProduct {
        slug: "grid-trading-bot",
        title: "Grid Trading Bot",
        description_short: "Robot EA dengan strategi grid trading. Cocok untuk pasar sideways \
            dan mudah diatur parameternya.",
        description_full: "Fitur:\n- Strategi grid otomatis\n- Parameter grid fleksibel\n\
            - Monitoring via Telegram\n\nDisclaimer: Tidak ada jaminan profit.",
        price_idr: 599_000,
        category: "robot",
        badges: &[],
        image: "https://images.unsplash.com/photo-1516321318423-f06f85e504b3?w=800&auto=format&fit=crop&q=60",
        is_active: true,
    },
    SeedProduct {
        slug: "psikologi-trading",
        title: "Psikologi Trading",
        description_short: "Ebook tentang mentalitas dan psikologi yang dibutuhkan untuk sukses \
            dalam trading. Wajib baca!",
        description_full: "Topik:\n- Mengontrol emosi saat trading\n- Mengatasi fear dan greed\n\
            - Disiplin dan konsistensi\n\nFormat: PDF (80+ halaman)",
        price_idr: 79_000,
        category: "ebook",
        badges: &[],
        image: "https://images.unsplash.com/photo-1456513080510-7bf3a84b82f8?w=800&auto=format&fit=crop&q=60",
        is_active: true,
    },
    SeedProduct {
        slug: "fxsociety-hoodie",
        title: "FXSociety Hoodie",
        description_short: "Hoodie premium dengan desain minimalis. Bahan fleece tebal yang \
            hangat dan stylish.",
        description_full: "Spesifikasi:\n- Bahan: Cotton Fleece\n- Ukuran: S, M, L, XL, XXL\n\n\
            Catatan: Produk ini sedang tidak tersedia.",
        price_idr: 250_000,
        category: "merchandise",
        badges: &[],
        image: "https://images.unsplash.com/photo-1556821840-3a63f95609a7?w=800&auto=format&fit=crop&q=60",
        is_active: false,
    },
];

/// Seeding errors
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid seed product: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl SeedProduct {
    fn to_new_product(&self) -> Result<NewProduct, ValidationError> {
        Ok(NewProduct {
            slug: Slug::new(self.slug)?,
            title: self.title.to_string(),
            description_short: self.description_short.to_string(),
            description_full: Some(self.description_full.to_string()),
            price_idr: self.price_idr,
            category: self.category.to_string(),
            badges: Some(self.badges.iter().map(|b| b.to_string()).collect()),
            images: Some(vec![self.image.to_string()]),
            is_active: self.is_active,
        })
    }
}

/// Insert the demo catalog. Returns how many products were added.
pub async fn run(pool: &PgPool) -> Result<usize, SeedError> {
    let repo = ProductRepo::new(pool);
    let mut inserted = 0;

    for item in CATALOG {
        match repo.create(&item.to_new_product()?).await {
            Ok(product) => {
                tracing::debug!(slug = %product.slug, "seeded product");
                inserted += 1;
            }
            Err(DbError::Conflict { .. }) => {
                tracing::debug!(slug = item.slug, "product already present, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(inserted, total = CATALOG.len(), "catalog seed complete");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entries_are_valid() {
        for item in CATALOG {
            let product = item.to_new_product().unwrap();
            assert!(product.price_idr > 0, "{}", item.slug);
        }
    }

    #[test]
    fn catalog_slugs_are_unique() {
        let mut slugs: Vec<_> = CATALOG.iter().map(|p| p.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), CATALOG.len());
    }

    #[test]
    fn only_the_hoodie_is_hidden() {
        let hidden: Vec<_> = CATALOG.iter().filter(|p| !p.is_active).map(|p| p.slug).collect();
        assert_eq!(hidden, vec!["fxsociety-hoodie"]);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn seeding_twice_inserts_nothing_new() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrations::run(&pool).await.unwrap();

        run(&pool).await.unwrap();
        assert_eq!(run(&pool).await.unwrap(), 0);
    }
}
