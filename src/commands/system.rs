use colored::Colorize;

pub fn print_help() {
    println!("\n{}", "🥗 Food Lens Commands:".bold());
    println!("  nutrition <food>  - Resolve nutrition facts per 100 g");
    println!("  Example: nutrition banana, nutrition grilled salmon");
    println!();

    println!("🔍 Database Commands:");
    println!("  search <query>    - Search FoodData Central");
    println!("  fdc <id>          - Show the nutrients of one FDC food");
    println!();

    println!("⚙️ System Commands:");
    println!("  help  - Show this help menu");
    println!("  exit  - Exit the program");
    println!();
}
