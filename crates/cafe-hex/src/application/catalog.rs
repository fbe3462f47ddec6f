use cafe_types::domain::menu::{Category, MenuItem};

/// Number of items shown as featured blends on the landing view.
pub const FEATURED_COUNT: usize = 3;

pub const MOOD_PRESETS: [&str; 5] = ["Energized", "Sleepy", "Romantic", "Adventurous", "Focus Mode"];

fn entry(
    id: &str,
    name: &str,
    description: &str,
    price_cents: i64,
    category: Category,
    image: &str,
    tags: &[&str],
) -> MenuItem {
    MenuItem {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        price_cents,
        category,
        image: format!("https://images.unsplash.com/{image}?auto=format&fit=crop&q=80&w=400"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// Built-in menu used when neither the cloud nor the local cache has one.
/// Also the seed written into an empty cloud collection.
pub fn fallback_menu() -> Vec<MenuItem> {
    vec![
        entry(
            "1",
            "Signature Espresso",
            "A robust, full-bodied espresso with notes of dark chocolate and toasted hazelnuts.",
            350,
            Category::HotCoffee,
            "photo-1510707577719-af3726527cc3",
            &["strong", "classic", "nutty"],
        ),
        entry(
            "2",
            "Caramel Macchiato",
            "Freshly steamed milk with vanilla syrup, marked with espresso and finished with caramel drizzle.",
            475,
            Category::HotCoffee,
            "photo-1485808191679-5f86510681a2",
            &["sweet", "creamy", "caramel"],
        ),
        entry(
            "3",
            "Nitro Cold Brew",
            "Small-batch cold brew infused with nitrogen for a naturally sweet, velvety crema.",
            525,
            Category::ColdCoffee,
            "photo-1517701604599-bb29b565090c",
            &["smooth", "caffeine-kick", "refreshing"],
        ),
        entry(
            "4",
            "Matcha Green Tea Latte",
            "Smooth and creamy matcha, sweetened just right and served with steamed milk.",
            450,
            Category::Tea,
            "photo-1515823064-d6e0c04616a7",
            &["healthy", "vibrant", "creamy"],
        ),
        entry(
            "5",
            "Almond Croissant",
            "A buttery, flaky croissant filled with almond cream and topped with toasted almond slices.",
            395,
            Category::Pastries,
            "photo-1555507036-ab1f4038808a",
            &["buttery", "sweet", "flaky"],
        ),
        entry(
            "6",
            "Honey Oat Milk Latte",
            "Espresso and oat milk with a touch of wild honey.",
            500,
            Category::HotCoffee,
            "photo-1541167760496-162955ed8a9f",
            &["vegan-option", "creamy", "honey"],
        ),
        entry(
            "7",
            "Iced Vanilla Bean Latte",
            "Madagascar vanilla bean paste with chilled milk, topped with espresso over ice.",
            495,
            Category::ColdCoffee,
            "photo-1517701550927-30cf4ba1dba5",
            &["sweet", "iced", "classic"],
        ),
        entry(
            "8",
            "Blueberry Lemon Muffin",
            "Fresh blueberries and a hint of lemon zest under a sugar crumble.",
            325,
            Category::Pastries,
            "photo-1587538637146-8ca0313b218f",
            &["fruit", "muffin", "citrus"],
        ),
    ]
}

pub fn filter_by_category(items: &[MenuItem], category: Option<Category>) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| category.map_or(true, |c| item.category == c))
        .cloned()
        .collect()
}

pub fn featured(items: &[MenuItem]) -> Vec<MenuItem> {
    items.iter().take(FEATURED_COUNT).cloned().collect()
}
