//! Shared fixtures for integration tests

use std::path::PathBuf;

use anyhow::Result;
use firm_finder_mcp::firms::Firm;
use tempfile::TempDir;

/// Ten firms across practice areas, countries and rank tiers
pub fn benchmark_firms() -> Vec<Firm> {
    vec![
        Firm::new("1", "Green Energy Solutions", "Chile")
            .with_region("Santiago")
            .with_area("Energía")
            .with_description("Proyectos de energía renovable, solar y eólica.")
            .with_tags(["energía", "solar", "proyectos"])
            .with_rank(2),
        Firm::new("2", "Tech Innovators Legal", "Chile")
            .with_region("Santiago")
            .with_area("Tecnología")
            .with_description("Contratos de software, protección de datos y fintech.")
            .with_tags(["tecnología", "software", "fintech"])
            .with_rank(1),
        Firm::new("3", "Environmental Law Experts", "Chile")
            .with_region("Valparaíso")
            .with_area("Medio Ambiente")
            .with_description("Permisos y evaluación de impacto.")
            .with_tags(["medio ambiente", "ecología", "sostenibilidad"])
            .with_rank(1),
        Firm::new("4", "Banking & Finance Partners", "Perú")
            .with_region("Lima")
            .with_area("Banca y Finanzas")
            .with_description("Financiamiento bancario y mercado de capitales.")
            .with_tags(["banca", "finanzas", "proyectos"])
            .with_rank(2),
        Firm::new("5", "Mining Rights Advisors", "Perú")
            .with_region("Arequipa")
            .with_area("Minería")
            .with_description("Concesiones mineras y recursos naturales.")
            .with_tags(["minería", "recursos naturales"])
            .with_rank(3),
        Firm::new("6", "Criminal Defense Group", "Colombia")
            .with_region("Bogotá")
            .with_area("Penal")
            .with_description("Defensa penal y delitos económicos.")
            .with_tags(["penal", "litigación"]),
        Firm::new("7", "Labor Rights Law Firm", "Colombia")
            .with_region("Medellín")
            .with_area("Laboral")
            .with_description("Relaciones laborales y sindicatos.")
            .with_tags(["laboral", "negociación colectiva"])
            .with_rank(4),
        Firm::new("8", "IP Protection Law", "México")
            .with_region("Ciudad de México")
            .with_area("Propiedad Intelectual")
            .with_description("Registro de marcas y patentes.")
            .with_tags(["marcas", "patentes"])
            .with_rank(3),
        Firm::new("9", "Tax Advisory Services", "México")
            .with_region("Monterrey")
            .with_area("Tributario")
            .with_description("Planificación tributaria e impuestos.")
            .with_tags(["impuestos", "tributario"]),
        Firm::new("10", "Real Estate Law Group", "Chile")
            .with_region("Santiago")
            .with_area("Inmobiliario")
            .with_description("Compraventa, arriendos y construcción.")
            .with_tags(["inmobiliario", "construcción"])
            .with_rank(2),
    ]
}

/// Write the benchmark firms to `firms.json` in a fresh temporary directory
pub fn write_firms_file() -> Result<(PathBuf, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("firms.json");
    std::fs::write(&path, serde_json::to_string(&benchmark_firms())?)?;
    Ok((path, temp_dir))
}
