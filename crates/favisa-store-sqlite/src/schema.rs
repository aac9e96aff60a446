//! SQL schema for the FAVISA SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Catalogs ────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS actividad_economica (
    id_ciiu     TEXT PRIMARY KEY NOT NULL CHECK (length(id_ciiu) > 0),
    descripcion TEXT NOT NULL,
    seccion     TEXT,
    division    TEXT
);

CREATE TABLE IF NOT EXISTS tipo_empresa (
    id_tipo_empresa TEXT PRIMARY KEY NOT NULL CHECK (length(id_tipo_empresa) > 0),
    descripcion     TEXT NOT NULL,
    abreviatura     TEXT
);

CREATE TABLE IF NOT EXISTS tamano_empresa (
    id_tamano       TEXT PRIMARY KEY NOT NULL CHECK (length(id_tamano) > 0),
    descripcion     TEXT NOT NULL,
    criterio_ventas TEXT
);

CREATE TABLE IF NOT EXISTS ubicacion_geografica (
    id_ubicacion    TEXT PRIMARY KEY NOT NULL CHECK (length(id_ubicacion) > 0),
    nombre_distrito TEXT NOT NULL,
    provincia       TEXT,
    departamento    TEXT,
    ubigeo_codigo   TEXT
);

CREATE TABLE IF NOT EXISTS estado_tributario (
    id_estado   TEXT PRIMARY KEY NOT NULL CHECK (length(id_estado) > 0),
    descripcion TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS condicion_domicilio (
    id_condicion TEXT PRIMARY KEY NOT NULL CHECK (length(id_condicion) > 0),
    descripcion  TEXT NOT NULL
);

-- ── Facts ───────────────────────────────────────────────────────────────────

-- One row per taxpayer. Catalog renames cascade into the key columns;
-- deleting a referenced catalog row fails.
CREATE TABLE IF NOT EXISTS contribuyente (
    ruc             INTEGER PRIMARY KEY NOT NULL CHECK (ruc > 0),
    id_ciiu         TEXT NOT NULL REFERENCES actividad_economica(id_ciiu)
                      ON UPDATE CASCADE ON DELETE RESTRICT,
    id_tipo_empresa TEXT NOT NULL REFERENCES tipo_empresa(id_tipo_empresa)
                      ON UPDATE CASCADE ON DELETE RESTRICT,
    id_tamano       TEXT NOT NULL REFERENCES tamano_empresa(id_tamano)
                      ON UPDATE CASCADE ON DELETE RESTRICT,
    id_ubicacion    TEXT NOT NULL REFERENCES ubicacion_geografica(id_ubicacion)
                      ON UPDATE CASCADE ON DELETE RESTRICT,
    id_estado       TEXT NOT NULL REFERENCES estado_tributario(id_estado)
                      ON UPDATE CASCADE ON DELETE RESTRICT,
    id_condicion    TEXT NOT NULL REFERENCES condicion_domicilio(id_condicion)
                      ON UPDATE CASCADE ON DELETE RESTRICT,
    sexo            TEXT NOT NULL DEFAULT 'ND'
                      CHECK (sexo IN ('HOMBRE', 'MUJER', 'ND')),
    edad            INTEGER CHECK (edad IS NULL OR edad BETWEEN 0 AND 120),
    -- canonical decimal text; digits and at most one point, never a sign
    deuda           TEXT NOT NULL DEFAULT '0'
                      CHECK (deuda GLOB '[0-9]*'
                             AND deuda NOT GLOB '*.'
                             AND deuda NOT GLOB '*[^0-9.]*'
                             AND deuda NOT GLOB '*.*.*')
);

CREATE INDEX IF NOT EXISTS contribuyente_ciiu_idx      ON contribuyente(id_ciiu);
CREATE INDEX IF NOT EXISTS contribuyente_tipo_idx      ON contribuyente(id_tipo_empresa);
CREATE INDEX IF NOT EXISTS contribuyente_tamano_idx    ON contribuyente(id_tamano);
CREATE INDEX IF NOT EXISTS contribuyente_ubicacion_idx ON contribuyente(id_ubicacion);
CREATE INDEX IF NOT EXISTS contribuyente_estado_idx    ON contribuyente(id_estado);
CREATE INDEX IF NOT EXISTS contribuyente_condicion_idx ON contribuyente(id_condicion);

-- Facts are insert-only. Key columns may still change through ON UPDATE
-- CASCADE; everything else is frozen.
CREATE TRIGGER IF NOT EXISTS contribuyente_immutable
BEFORE UPDATE OF ruc, sexo, edad, deuda ON contribuyente
BEGIN
    SELECT RAISE(ABORT, 'contribuyente rows are immutable');
END;

-- ── Read model ──────────────────────────────────────────────────────────────

CREATE VIEW IF NOT EXISTS v_contribuyente_detalle AS
SELECT
    c.ruc,
    c.id_ciiu,         ae.descripcion      AS actividad,
    c.id_tipo_empresa, te.descripcion      AS tipo_empresa,
    c.id_tamano,       tm.descripcion      AS tamano,
    c.id_ubicacion,    ug.nombre_distrito  AS distrito,
    ug.provincia,      ug.departamento,
    c.id_estado,       et.descripcion      AS estado,
    c.id_condicion,    cd.descripcion      AS condicion,
    c.sexo, c.edad, c.deuda
FROM contribuyente c
JOIN actividad_economica  ae ON ae.id_ciiu         = c.id_ciiu
JOIN tipo_empresa         te ON te.id_tipo_empresa = c.id_tipo_empresa
JOIN tamano_empresa       tm ON tm.id_tamano       = c.id_tamano
JOIN ubicacion_geografica ug ON ug.id_ubicacion    = c.id_ubicacion
JOIN estado_tributario    et ON et.id_estado       = c.id_estado
JOIN condicion_domicilio  cd ON cd.id_condicion    = c.id_condicion;

-- ── Analysis results sink ───────────────────────────────────────────────────

-- Written by external analytics; append-only.
CREATE TABLE IF NOT EXISTS resultado_analisis (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre_analisis TEXT NOT NULL,
    categoria       TEXT,
    metrica         TEXT,
    valor_numerico  REAL,
    valor_texto     TEXT,
    fecha_ejecucion TEXT NOT NULL   -- ISO 8601 UTC; store-assigned
);

CREATE INDEX IF NOT EXISTS resultado_analisis_nombre_idx
    ON resultado_analisis(nombre_analisis);

CREATE TRIGGER IF NOT EXISTS resultado_analisis_no_update
BEFORE UPDATE ON resultado_analisis
BEGIN
    SELECT RAISE(ABORT, 'resultado_analisis is append-only');
END;

CREATE TRIGGER IF NOT EXISTS resultado_analisis_no_delete
BEFORE DELETE ON resultado_analisis
BEGIN
    SELECT RAISE(ABORT, 'resultado_analisis is append-only');
END;

PRAGMA user_version = 1;
";

/// Every table, in the order the summary reports them.
pub const TABLES: [&str; 8] = [
  "contribuyente",
  "actividad_economica",
  "tipo_empresa",
  "tamano_empresa",
  "ubicacion_geografica",
  "estado_tributario",
  "condicion_domicilio",
  "resultado_analisis",
];
