// ============================================================================
// Stock Ticker - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;      // Fournisseurs de données (Yahoo Finance)
pub mod app;      // État du dashboard et single-flight
pub mod catalog;  // Catalogue de symboles chargé au démarrage
pub mod chart;    // Rendu des séries en ChartSpec
pub mod config;   // Configuration par variables d'environnement
pub mod models;   // Structures de données
pub mod pipeline; // Fonction de transition : formulaire -> graphique
pub mod web;      // Page et API HTTP
